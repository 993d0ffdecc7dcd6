//! Typed messages screens hand back to the navigator.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    HybridBooking, PassengerDetails, Route, RouteSubscription, SubscriptionQuote, SubscriptionTerms,
    Ticket, TicketStatus,
};

/// Every screen the controller can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Login,
    Signup,
    Onboarding,
    ResetPassword,
    Home,
    SearchResults,
    PassengerDetails,
    Payment,
    Ticket,
    Profile,
    Trips,
    Discover,
    SubscriptionPayment,
    HybridBooking,
    HybridPayment,
    HybridTickets,
    TrackBus,
}

impl Screen {
    /// Screens reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Screen::Login | Screen::Signup | Screen::Onboarding | Screen::ResetPassword
        )
    }
}

/// How a route was picked for the passenger details screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RouteSelection {
    Single { route: Route, date: Option<NaiveDate> },
    Subscription { route: Route, terms: SubscriptionTerms },
}

/// Navigation target together with the payload that screen needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Destination {
    Plain { screen: Screen },
    SearchResults { date: NaiveDate },
    PassengerDetails { selection: RouteSelection },
    SubscriptionPayment { quote: SubscriptionQuote },
    HybridPayment { booking: HybridBooking },
    Ticket { ticket: Ticket },
    TrackBus { ticket: Ticket },
}

impl Destination {
    pub fn screen(&self) -> Screen {
        match self {
            Destination::Plain { screen } => *screen,
            Destination::SearchResults { .. } => Screen::SearchResults,
            Destination::PassengerDetails { .. } => Screen::PassengerDetails,
            Destination::SubscriptionPayment { .. } => Screen::SubscriptionPayment,
            Destination::HybridPayment { .. } => Screen::HybridPayment,
            Destination::Ticket { .. } => Screen::Ticket,
            Destination::TrackBus { .. } => Screen::TrackBus,
        }
    }
}

impl From<Screen> for Destination {
    fn from(screen: Screen) -> Self {
        Destination::Plain { screen }
    }
}

/// Persisted single-trip booking, as reported by the payment screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedBooking {
    pub booking_id: Uuid,
    pub ticket_number: String,
    pub status: TicketStatus,
    pub delay_minutes: Option<i32>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentReceipt {
    Booked(IssuedBooking),
    Subscribed(RouteSubscription),
}

/// Result a screen finished with.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    SignedIn,
    SignedOut,
    PasswordReset,
    PassengerDetails(PassengerDetails),
    Payment(PaymentReceipt),
    SubscriptionPayment(RouteSubscription),
    HybridBooking(HybridBooking),
    HybridPayment(Vec<Ticket>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavIntent {
    Back,
    Home,
    NavigateTo(Destination),
    SelectRoute { route: Route, date: Option<NaiveDate> },
    Complete(Completion),
}

pub const SINGLE_TICKET_DELAY_PROBABILITY: f64 = 0.3;
pub const HYBRID_TICKET_DELAY_PROBABILITY: f64 = 0.2;
pub const DELAY_MINUTES: i32 = 30;

/// Random status for a freshly issued ticket.
pub fn draw_ticket_status<R: Rng>(rng: &mut R, delay_probability: f64) -> (TicketStatus, Option<i32>) {
    if rng.gen_bool(delay_probability) {
        (TicketStatus::Delayed, Some(DELAY_MINUTES))
    } else {
        (TicketStatus::Confirmed, None)
    }
}

/// `{prefix}` + the last `digits` digits of the issue time in milliseconds.
pub fn ticket_number(prefix: &str, issued_at: DateTime<Utc>, digits: usize) -> String {
    let millis = issued_at.timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(digits)..];
    format!("{}{}", prefix, tail)
}

pub fn barcode(prefix: &str, issued_at: DateTime<Utc>) -> String {
    format!("{}{}", prefix, issued_at.timestamp_millis())
}
