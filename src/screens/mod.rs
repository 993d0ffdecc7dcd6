//! Screens of the booking app.
//!
//! Each screen owns its form state, reacts to user actions and to the
//! outcome of effects it issued, and reports back with a [`Step`]. Screens
//! never touch the navigator or one another.

pub mod auth;
pub mod discover;
pub mod home;
pub mod hybrid;
pub mod passenger_details;
pub mod payment;
pub mod profile;
pub mod search_results;
pub mod tickets;
pub mod tracking;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::effects::{Effect, Outcome};
use crate::navigation::{Destination, NavIntent, Screen, Slots};

/// Validation messages keyed by form field.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// What a screen wants after handling an action or an outcome.
#[derive(Debug)]
pub enum Step {
    None,
    Intent(NavIntent),
    Effect(Effect),
}

impl Step {
    pub fn navigate(destination: impl Into<Destination>) -> Self {
        Step::Intent(NavIntent::NavigateTo(destination.into()))
    }
}

/// User input posted by the renderer.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    Back,
    Home,
    /// Bottom navigation and plain links.
    Open(Screen),
    Login(auth::LoginAction),
    Signup(auth::SignupAction),
    Onboarding(auth::OnboardingAction),
    ResetPassword(auth::ResetPasswordAction),
    Search(home::HomeAction),
    Results(search_results::ResultsAction),
    Passenger(passenger_details::PassengerAction),
    Payment(payment::PaymentAction),
    Ticket(tickets::TicketAction),
    Trips(tickets::TripsAction),
    HybridTickets(tickets::HybridTicketsAction),
    Hybrid(hybrid::HybridAction),
    Tracking(tracking::TrackingAction),
    Profile(profile::ProfileAction),
    Discover(discover::DiscoverAction),
}

/// The mounted screen.
#[derive(Debug)]
pub enum ScreenState {
    Login(auth::LoginScreen),
    Signup(auth::SignupScreen),
    Onboarding(auth::OnboardingScreen),
    ResetPassword(auth::ResetPasswordScreen),
    Home(home::HomeScreen),
    SearchResults(search_results::SearchResultsScreen),
    PassengerDetails(passenger_details::PassengerDetailsScreen),
    Payment(payment::PaymentScreen),
    Ticket(tickets::TicketScreen),
    Profile(profile::ProfileScreen),
    Trips(tickets::TripsScreen),
    Discover(discover::DiscoverScreen),
    SubscriptionPayment(payment::SubscriptionPaymentScreen),
    HybridBooking(hybrid::HybridBookingScreen),
    HybridPayment(payment::HybridPaymentScreen),
    HybridTickets(tickets::HybridTicketsScreen),
    TrackBus(tracking::TrackBusScreen),
    /// A screen whose payload slot is empty renders nothing.
    Blank(Screen),
}

impl ScreenState {
    pub fn build(screen: Screen, slots: &Slots, ctx: &AppContext) -> Self {
        let state = match screen {
            Screen::Login => Some(ScreenState::Login(auth::LoginScreen::default())),
            Screen::Signup => Some(ScreenState::Signup(auth::SignupScreen::default())),
            Screen::Onboarding => Some(ScreenState::Onboarding(auth::OnboardingScreen::default())),
            Screen::ResetPassword => Some(ScreenState::ResetPassword(auth::ResetPasswordScreen::default())),
            Screen::Home => Some(ScreenState::Home(home::HomeScreen::new())),
            Screen::SearchResults => Some(ScreenState::SearchResults(search_results::SearchResultsScreen::new(
                slots, ctx,
            ))),
            Screen::PassengerDetails => passenger_details::PassengerDetailsScreen::new(slots, ctx)
                .map(ScreenState::PassengerDetails),
            Screen::Payment => slots
                .booking
                .clone()
                .map(|booking| ScreenState::Payment(payment::PaymentScreen::new(booking))),
            Screen::Ticket => slots
                .ticket
                .clone()
                .map(|ticket| ScreenState::Ticket(tickets::TicketScreen::new(ticket))),
            Screen::Profile => Some(ScreenState::Profile(profile::ProfileScreen::new(ctx))),
            Screen::Trips => Some(ScreenState::Trips(tickets::TripsScreen::default())),
            Screen::Discover => Some(ScreenState::Discover(discover::DiscoverScreen::default())),
            Screen::SubscriptionPayment => slots
                .subscription_quote
                .clone()
                .map(|quote| ScreenState::SubscriptionPayment(payment::SubscriptionPaymentScreen::new(quote))),
            Screen::HybridBooking => Some(ScreenState::HybridBooking(hybrid::HybridBookingScreen::default())),
            Screen::HybridPayment => slots
                .hybrid_booking
                .clone()
                .map(|booking| ScreenState::HybridPayment(payment::HybridPaymentScreen::new(booking))),
            Screen::HybridTickets => Some(ScreenState::HybridTickets(tickets::HybridTicketsScreen::new(
                slots.hybrid_tickets.clone(),
            ))),
            Screen::TrackBus => slots
                .ticket
                .clone()
                .map(|ticket| ScreenState::TrackBus(tracking::TrackBusScreen::new(ticket))),
        };

        state.unwrap_or_else(|| {
            tracing::debug!(?screen, "Screen payload missing, rendering nothing");
            ScreenState::Blank(screen)
        })
    }

    pub fn screen(&self) -> Screen {
        match self {
            ScreenState::Login(_) => Screen::Login,
            ScreenState::Signup(_) => Screen::Signup,
            ScreenState::Onboarding(_) => Screen::Onboarding,
            ScreenState::ResetPassword(_) => Screen::ResetPassword,
            ScreenState::Home(_) => Screen::Home,
            ScreenState::SearchResults(_) => Screen::SearchResults,
            ScreenState::PassengerDetails(_) => Screen::PassengerDetails,
            ScreenState::Payment(_) => Screen::Payment,
            ScreenState::Ticket(_) => Screen::Ticket,
            ScreenState::Profile(_) => Screen::Profile,
            ScreenState::Trips(_) => Screen::Trips,
            ScreenState::Discover(_) => Screen::Discover,
            ScreenState::SubscriptionPayment(_) => Screen::SubscriptionPayment,
            ScreenState::HybridBooking(_) => Screen::HybridBooking,
            ScreenState::HybridPayment(_) => Screen::HybridPayment,
            ScreenState::HybridTickets(_) => Screen::HybridTickets,
            ScreenState::TrackBus(_) => Screen::TrackBus,
            ScreenState::Blank(screen) => *screen,
        }
    }

    /// Work to start as soon as the screen is shown.
    pub fn on_mount(&mut self, ctx: &AppContext) -> Step {
        match self {
            ScreenState::Profile(s) => s.on_mount(ctx),
            ScreenState::Trips(s) => s.on_mount(),
            ScreenState::Discover(s) => s.on_mount(),
            ScreenState::TrackBus(s) => s.on_mount(),
            _ => Step::None,
        }
    }

    pub fn update(&mut self, action: Action, ctx: &mut AppContext) -> Step {
        match (self, action) {
            (_, Action::Back) => Step::Intent(NavIntent::Back),
            (_, Action::Home) => Step::Intent(NavIntent::Home),
            (_, Action::Open(screen)) => Step::navigate(screen),
            (ScreenState::Login(s), Action::Login(a)) => s.update(a),
            (ScreenState::Signup(s), Action::Signup(a)) => s.update(a),
            (ScreenState::Onboarding(s), Action::Onboarding(a)) => s.update(a),
            (ScreenState::ResetPassword(s), Action::ResetPassword(a)) => s.update(a),
            (ScreenState::Home(s), Action::Search(a)) => s.update(a, ctx),
            (ScreenState::SearchResults(s), Action::Results(a)) => s.update(a),
            (ScreenState::PassengerDetails(s), Action::Passenger(a)) => s.update(a),
            (ScreenState::Payment(s), Action::Payment(a)) => s.update(a),
            (ScreenState::SubscriptionPayment(s), Action::Payment(a)) => s.update(a),
            (ScreenState::HybridPayment(s), Action::Payment(a)) => s.update(a),
            (ScreenState::Ticket(s), Action::Ticket(a)) => s.update(a),
            (ScreenState::Trips(s), Action::Trips(a)) => s.update(a),
            (ScreenState::HybridTickets(s), Action::HybridTickets(a)) => s.update(a),
            (ScreenState::HybridBooking(s), Action::Hybrid(a)) => s.update(a),
            (ScreenState::TrackBus(s), Action::Tracking(a)) => s.update(a),
            (ScreenState::Profile(s), Action::Profile(a)) => s.update(a, ctx),
            (ScreenState::Discover(s), Action::Discover(a)) => s.update(a, ctx),
            (state, action) => {
                tracing::debug!(screen = ?state.screen(), ?action, "Action does not apply to the mounted screen");
                Step::None
            }
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome, ctx: &mut AppContext) -> Step {
        match self {
            ScreenState::Login(s) => s.on_outcome(outcome, ctx),
            ScreenState::Signup(s) => s.on_outcome(outcome, ctx),
            ScreenState::Onboarding(s) => s.on_outcome(outcome, ctx),
            ScreenState::ResetPassword(s) => s.on_outcome(outcome),
            ScreenState::Home(s) => s.on_outcome(outcome, ctx),
            ScreenState::Payment(s) => s.on_outcome(outcome),
            ScreenState::SubscriptionPayment(s) => s.on_outcome(outcome),
            ScreenState::HybridPayment(s) => s.on_outcome(outcome),
            ScreenState::Trips(s) => s.on_outcome(outcome),
            ScreenState::HybridBooking(s) => s.on_outcome(outcome),
            ScreenState::TrackBus(s) => s.on_outcome(outcome),
            ScreenState::Profile(s) => s.on_outcome(outcome, ctx),
            ScreenState::Discover(s) => s.on_outcome(outcome),
            state => {
                tracing::debug!(screen = ?state.screen(), ?outcome, "Outcome ignored");
                Step::None
            }
        }
    }

    pub fn view(&self, ctx: &AppContext) -> ScreenBody {
        match self {
            ScreenState::Login(s) => ScreenBody::Login(s.clone()),
            ScreenState::Signup(s) => ScreenBody::Signup(s.clone()),
            ScreenState::Onboarding(s) => ScreenBody::Onboarding(s.clone()),
            ScreenState::ResetPassword(s) => ScreenBody::ResetPassword(s.view()),
            ScreenState::Home(s) => ScreenBody::Home(s.view(ctx)),
            ScreenState::SearchResults(s) => ScreenBody::SearchResults(s.clone()),
            ScreenState::PassengerDetails(s) => ScreenBody::PassengerDetails(s.clone()),
            ScreenState::Payment(s) => ScreenBody::Payment(s.view()),
            ScreenState::Ticket(s) => ScreenBody::Ticket(s.clone()),
            ScreenState::Profile(s) => ScreenBody::Profile(s.view(ctx)),
            ScreenState::Trips(s) => ScreenBody::Trips(s.view()),
            ScreenState::Discover(s) => ScreenBody::Discover(s.view()),
            ScreenState::SubscriptionPayment(s) => ScreenBody::SubscriptionPayment(s.view()),
            ScreenState::HybridBooking(s) => ScreenBody::HybridBooking(s.view()),
            ScreenState::HybridPayment(s) => ScreenBody::HybridPayment(s.view()),
            ScreenState::HybridTickets(s) => ScreenBody::HybridTickets(s.view()),
            ScreenState::TrackBus(s) => ScreenBody::TrackBus(s.view()),
            ScreenState::Blank(_) => ScreenBody::Blank,
        }
    }
}

/// Serializable rendering of the mounted screen.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScreenBody {
    Login(auth::LoginScreen),
    Signup(auth::SignupScreen),
    Onboarding(auth::OnboardingScreen),
    ResetPassword(auth::ResetPasswordView),
    Home(home::HomeView),
    SearchResults(search_results::SearchResultsScreen),
    PassengerDetails(passenger_details::PassengerDetailsScreen),
    Payment(payment::PaymentView),
    Ticket(tickets::TicketScreen),
    Profile(profile::ProfileView),
    Trips(tickets::TripsView),
    Discover(discover::DiscoverView),
    SubscriptionPayment(payment::PaymentView),
    HybridBooking(hybrid::HybridBookingView),
    HybridPayment(payment::PaymentView),
    HybridTickets(tickets::HybridTicketsView),
    TrackBus(tracking::TrackingView),
    Blank,
}

/// Banner text shared by most screens.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Banner {
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Banner {
    pub fn error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.notice = None;
    }

    pub fn notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
        self.error = None;
    }

    pub fn clear(&mut self) {
        self.error = None;
        self.notice = None;
    }
}

pub(crate) fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
        false
    } else {
        true
    }
}

/// Loose `local@domain.tld` check.
pub(crate) fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !value.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_route;

    #[test]
    fn test_missing_payload_renders_blank() {
        let ctx = AppContext::new();
        let slots = Slots::default();
        for screen in [
            Screen::PassengerDetails,
            Screen::Payment,
            Screen::Ticket,
            Screen::SubscriptionPayment,
            Screen::HybridPayment,
            Screen::TrackBus,
        ] {
            let state = ScreenState::build(screen, &slots, &ctx);
            assert!(matches!(state, ScreenState::Blank(s) if s == screen), "{:?}", screen);
            assert!(matches!(state.view(&ctx), ScreenBody::Blank));
        }
    }

    #[test]
    fn test_passenger_details_builds_with_route() {
        let ctx = AppContext::new();
        let slots = Slots {
            route: Some(sample_route()),
            ..Default::default()
        };
        let state = ScreenState::build(Screen::PassengerDetails, &slots, &ctx);
        assert_eq!(state.screen(), Screen::PassengerDetails);
        assert!(!matches!(state, ScreenState::Blank(_)));
    }

    #[test]
    fn test_action_for_other_screen_is_ignored() {
        let mut ctx = AppContext::new();
        let mut state = ScreenState::build(Screen::Login, &Slots::default(), &ctx);
        let step = state.update(Action::Payment(payment::PaymentAction::Confirm), &mut ctx);
        assert!(matches!(step, Step::None));
    }

    #[test]
    fn test_action_wire_format() {
        let action: Action = serde_json::from_value(serde_json::json!({ "type": "open", "payload": "trips" })).unwrap();
        assert!(matches!(action, Action::Open(Screen::Trips)));

        let action: Action = serde_json::from_value(serde_json::json!({ "type": "back" })).unwrap();
        assert!(matches!(action, Action::Back));
    }

    #[test]
    fn test_email_check() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada obi@example.com"));
    }
}
