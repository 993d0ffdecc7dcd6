//! Navigation controller.
//!
//! Holds the current screen, the back stack and the payload slots of the
//! booking flow in progress. Transitions that miss a precondition (no route
//! selected, no booking to pay for, private screen without a session) leave
//! the state untouched.

pub mod intent;

use chrono::NaiveDate;

use crate::models::{BookingDetails, HybridBooking, PassengerDetails, Route, SubscriptionQuote, SubscriptionTerms, Ticket};
use crate::utils::{dates, pricing};

pub use intent::{Completion, Destination, IssuedBooking, NavIntent, PaymentReceipt, RouteSelection, Screen};

/// Payloads carried between screens of one flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slots {
    pub route: Option<Route>,
    pub date: Option<NaiveDate>,
    /// Set while passenger details are collected for a weekly pass.
    pub subscription: Option<SubscriptionTerms>,
    pub booking: Option<BookingDetails>,
    pub ticket: Option<Ticket>,
    pub subscription_quote: Option<SubscriptionQuote>,
    pub hybrid_booking: Option<HybridBooking>,
    pub hybrid_tickets: Vec<Ticket>,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
    history: Vec<Screen>,
    slots: Slots,
    authenticated: bool,
    epoch: u64,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Screen::Login,
            history: vec![Screen::Login],
            slots: Slots::default(),
            authenticated: false,
            epoch: 0,
        }
    }

    /// Screen to render. Private screens render as login until a session
    /// exists.
    pub fn current(&self) -> Screen {
        if self.authenticated || self.current.is_public() {
            self.current
        } else {
            Screen::Login
        }
    }

    pub fn history(&self) -> &[Screen] {
        &self.history
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Bumped on every transition; a new value means the mounted screen is
    /// stale.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Apply one intent. Returns false when it was ignored.
    pub fn apply(&mut self, intent: NavIntent) -> bool {
        match intent {
            NavIntent::Back => {
                self.go_back();
                true
            }
            NavIntent::Home => {
                self.go_home();
                true
            }
            NavIntent::NavigateTo(destination) => self.navigate(destination),
            NavIntent::SelectRoute { route, date } => self.select_route(route, date),
            NavIntent::Complete(completion) => self.complete(completion),
        }
    }

    pub fn navigate(&mut self, destination: Destination) -> bool {
        let target = destination.screen();
        if !self.reachable(target) {
            tracing::debug!(?target, "Navigation refused without a session");
            return false;
        }

        match destination {
            Destination::Plain { .. } => {}
            Destination::SearchResults { date } => self.slots.date = Some(date),
            Destination::PassengerDetails { selection } => match selection {
                RouteSelection::Single { route, date } => {
                    self.slots.subscription = None;
                    self.slots.route = Some(route);
                    self.slots.date = Some(date.unwrap_or_else(dates::today));
                }
                RouteSelection::Subscription { route, terms } => {
                    self.slots.subscription = Some(terms);
                    self.slots.route = Some(route);
                }
            },
            Destination::SubscriptionPayment { quote } => self.slots.subscription_quote = Some(quote),
            Destination::HybridPayment { booking } => self.slots.hybrid_booking = Some(booking),
            Destination::Ticket { ticket } | Destination::TrackBus { ticket } => self.slots.ticket = Some(ticket),
        }

        if target != self.current {
            self.history.push(self.current);
        }
        self.show(target);
        true
    }

    /// Pop the back stack, or land on the start screen when it is empty.
    pub fn go_back(&mut self) {
        match self.history.pop() {
            Some(previous) => self.show(previous),
            None => self.reset_to(self.landing()),
        }
    }

    /// Back to the start screen with a fresh stack. Abandons the flow in
    /// progress, so every slot is cleared.
    pub fn go_home(&mut self) {
        self.slots = Slots::default();
        self.reset_to(self.landing());
    }

    pub fn select_route(&mut self, route: Route, date: Option<NaiveDate>) -> bool {
        if !self.authenticated {
            return false;
        }
        self.slots.subscription = None;
        self.slots.route = Some(route);
        self.slots.date = Some(date.unwrap_or_else(dates::today));
        self.push_and_show(Screen::PassengerDetails);
        true
    }

    pub fn submit_passenger_details(&mut self, details: PassengerDetails) -> bool {
        let Some(route) = self.slots.route.clone() else {
            return false;
        };

        let booking = match self.slots.subscription {
            Some(terms) => {
                if terms.duration_weeks == 0 {
                    return false;
                }
                BookingDetails {
                    total_fare: pricing::weekly_subscription_fare(route.price, terms.duration_weeks).total,
                    date: terms.start_date,
                    boarding_point: details.boarding_point.clone(),
                    deboarding_point: details.deboarding_point.clone(),
                    subscription: Some(terms),
                    passenger: details,
                    route,
                }
            }
            None => BookingDetails {
                total_fare: pricing::single_fare(route.price),
                date: self.slots.date.unwrap_or_else(dates::today),
                boarding_point: details.boarding_point.clone(),
                deboarding_point: details.deboarding_point.clone(),
                subscription: None,
                passenger: details,
                route,
            },
        };

        self.slots.booking = Some(booking);
        self.push_and_show(Screen::Payment);
        true
    }

    pub fn complete_payment(&mut self, receipt: PaymentReceipt) -> bool {
        let Some(booking) = self.slots.booking.as_ref() else {
            return false;
        };

        match (booking.is_subscription(), receipt) {
            (true, PaymentReceipt::Subscribed(_)) => {
                self.slots.booking = None;
                self.slots.subscription = None;
                self.reset_to(Screen::Profile);
                true
            }
            (false, PaymentReceipt::Booked(issued)) => {
                let ticket = Ticket {
                    id: issued.booking_id.to_string(),
                    ticket_number: issued.ticket_number,
                    passenger_name: booking.passenger.name.clone(),
                    route: booking.route.label(),
                    boarding_time: booking.route.departure_time.clone(),
                    boarding_point: booking.boarding_point.clone(),
                    deboarding_point: booking.deboarding_point.clone(),
                    date: booking.date,
                    status: issued.status,
                    delay_minutes: issued.delay_minutes,
                    barcode: intent::barcode("MB", issued.issued_at),
                };
                self.slots.booking = None;
                self.slots.ticket = Some(ticket);
                self.push_and_show(Screen::Ticket);
                true
            }
            (is_subscription, receipt) => {
                tracing::warn!(is_subscription, ?receipt, "Payment receipt does not match the booking");
                false
            }
        }
    }

    fn complete(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::SignedIn => {
                self.authenticated = true;
                self.slots = Slots::default();
                self.reset_to(Screen::Home);
                true
            }
            Completion::SignedOut => {
                self.authenticated = false;
                self.slots = Slots::default();
                self.reset_to(Screen::Login);
                true
            }
            Completion::PasswordReset => {
                self.reset_to(self.landing());
                true
            }
            Completion::PassengerDetails(details) => self.submit_passenger_details(details),
            Completion::Payment(receipt) => self.complete_payment(receipt),
            Completion::SubscriptionPayment(_) => {
                if self.slots.subscription_quote.take().is_none() {
                    return false;
                }
                self.push_and_show(Screen::Profile);
                true
            }
            Completion::HybridBooking(booking) => {
                if !self.authenticated || booking.dates.is_empty() {
                    return false;
                }
                self.slots.hybrid_booking = Some(booking);
                self.push_and_show(Screen::HybridPayment);
                true
            }
            Completion::HybridPayment(tickets) => {
                if self.slots.hybrid_booking.take().is_none() {
                    return false;
                }
                self.slots.hybrid_tickets = tickets;
                self.push_and_show(Screen::HybridTickets);
                true
            }
        }
    }

    fn reachable(&self, target: Screen) -> bool {
        self.authenticated || target.is_public()
    }

    fn landing(&self) -> Screen {
        if self.authenticated { Screen::Home } else { Screen::Login }
    }

    fn push_and_show(&mut self, target: Screen) {
        self.history.push(self.current);
        self.show(target);
    }

    fn reset_to(&mut self, target: Screen) {
        self.history = vec![target];
        self.show(target);
    }

    fn show(&mut self, target: Screen) {
        self.current = target;
        self.epoch += 1;
    }
}
