//! Domain records shared by the controller and the screens.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::pricing::FareBreakdown;

pub use crate::entities::booking::BookingStatus as TicketStatus;
pub use crate::entities::bus_tracking::{TrackingStage, TrackingStatus};

/// Stops served by the Berger ↔ Lekki corridor, used when a route row
/// carries no stop list of its own.
pub const DEFAULT_STOPS: [&str; 11] = [
    "Berger Bus Stop",
    "Magodo Phase II (Secretariat)",
    "7UP Toll Gate",
    "Alapere",
    "Ogudu",
    "Iyana-Oworo",
    "Bonny Camp",
    "Adeola Odeku Junction",
    "Eko Hotel Roundabout",
    "Sandfill Bus Stop",
    "Lekki Phase 1",
];

/// Route shortcuts offered on every profile, written "origin - destination".
pub const PREFERRED_ROUTES: [&str; 2] = ["Berger - Lekki Phase 1", "TBS - Ikorodu"];

/// One scheduled bus run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub duration: String,
    pub price: i64,
    pub departure_time: String,
    pub arrival_time: String,
    pub available_seats: i32,
    pub stops: Option<Vec<String>>,
    pub boarding_point: Option<String>,
    pub deboarding_point: Option<String>,
    pub total_stops: Option<i32>,
}

impl Route {
    /// "Berger → Lekki Phase 1"
    pub fn label(&self) -> String {
        format!("{} → {}", self.from, self.to)
    }

    pub fn stop_list(&self) -> Vec<String> {
        match &self.stops {
            Some(stops) if !stops.is_empty() => stops.clone(),
            _ => DEFAULT_STOPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassengerDetails {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub email: String,
    pub phone_number: String,
    pub boarding_point: String,
    pub deboarding_point: String,
    pub subscribe_to_updates: bool,
    pub receive_alerts: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTerms {
    pub duration_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// In-flight booking. A booking with `subscription` set is a recurring pass,
/// without it a single-date trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetails {
    pub route: Route,
    pub passenger: PassengerDetails,
    pub boarding_point: String,
    pub deboarding_point: String,
    pub date: NaiveDate,
    pub total_fare: i64,
    pub subscription: Option<SubscriptionTerms>,
}

impl BookingDetails {
    pub fn is_subscription(&self) -> bool {
        self.subscription.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub ticket_number: String,
    pub passenger_name: String,
    pub route: String,
    pub boarding_time: String,
    pub boarding_point: String,
    pub deboarding_point: String,
    pub date: NaiveDate,
    pub status: TicketStatus,
    pub delay_minutes: Option<i32>,
    pub barcode: String,
}

impl Ticket {
    pub fn status_text(&self) -> String {
        match self.status {
            TicketStatus::Confirmed => "Confirmed".to_string(),
            TicketStatus::Delayed => format!("Delayed by {} mins", self.delay_minutes.unwrap_or(0)),
            TicketStatus::Cancelled => "Cancelled".to_string(),
        }
    }

    /// Multi-day tickets carry the `HB` prefix.
    pub fn is_hybrid(&self) -> bool {
        self.ticket_number.starts_with("HB")
    }
}

/// One route booked on several chosen working days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridBooking {
    pub route: Route,
    pub boarding_point: String,
    pub deboarding_point: String,
    /// Ascending, no duplicates.
    pub dates: Vec<NaiveDate>,
    pub fare: FareBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Weekly { weeks: u32 },
    Custom { dates: Vec<NaiveDate> },
}

impl SubscriptionPlan {
    pub fn description(&self) -> String {
        match self {
            SubscriptionPlan::Weekly { weeks: 1 } => "1 week of daily commuting (Mon-Fri)".to_string(),
            SubscriptionPlan::Weekly { weeks } => format!("{} weeks of daily commuting (Mon-Fri)", weeks),
            SubscriptionPlan::Custom { dates } => format!("{} custom selected working days", dates.len()),
        }
    }
}

/// Priced subscription plan waiting for payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionQuote {
    pub route: Route,
    pub plan: SubscriptionPlan,
    pub fare: FareBreakdown,
}

impl SubscriptionQuote {
    /// Covered period when paid on `today`.
    pub fn period(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match &self.plan {
            SubscriptionPlan::Weekly { weeks } => (today, crate::utils::dates::add_weeks(today, *weeks)),
            SubscriptionPlan::Custom { dates } => (today, dates.iter().max().copied().unwrap_or(today)),
        }
    }

    pub fn duration_weeks(&self) -> u32 {
        match &self.plan {
            SubscriptionPlan::Weekly { weeks } => *weeks,
            SubscriptionPlan::Custom { dates } => (dates.len() as u32).div_ceil(5).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSubscription {
    pub id: Uuid,
    pub route: String,
    pub duration_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub discount: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub emergency_contact: String,
    pub preferred_routes: Vec<String>,
    pub subscriptions: Vec<RouteSubscription>,
    pub wallet_balance: i64,
}

/// Editable subset of the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub emergency_contact: String,
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            phone_number: profile.phone_number.clone(),
            email: profile.email.clone(),
            emergency_contact: profile.emergency_contact.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusTracking {
    pub id: Option<Uuid>,
    pub bus_number: String,
    pub driver_name: String,
    pub status: TrackingStatus,
    pub current_stage: TrackingStage,
    pub distance_to_pickup_km: f64,
    pub eta_minutes: i32,
    pub last_updated: DateTime<Utc>,
    pub status_message: String,
    pub notify_10min: bool,
    pub notify_delay: bool,
}

impl BusTracking {
    /// Shown until the tracking row for a booking has been read.
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            bus_number: "Bus 07".to_string(),
            driver_name: "Taye".to_string(),
            status: TrackingStatus::EnRoute,
            current_stage: TrackingStage::Approaching,
            distance_to_pickup_km: 5.2,
            eta_minutes: 15,
            last_updated: now,
            status_message: "Your bus is moving smoothly and will arrive shortly.".to_string(),
            notify_10min: true,
            notify_delay: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TenMinutes,
    Delay,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Wallet,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankDetails {
    pub bank_name: &'static str,
    pub account_name: &'static str,
    pub account_number: &'static str,
    pub sort_code: &'static str,
}

pub const BANK_DETAILS: BankDetails = BankDetails {
    bank_name: "First Bank of Nigeria",
    account_name: "Metro Bus Services Ltd",
    account_number: "2034567890",
    sort_code: "011-152-003",
};

#[cfg(test)]
pub(crate) fn sample_route() -> Route {
    Route {
        id: Uuid::from_u128(1),
        from: "Berger".to_string(),
        to: "Lekki Phase 1".to_string(),
        duration: "1h 30m".to_string(),
        price: 2400,
        departure_time: "05:40".to_string(),
        arrival_time: "07:50".to_string(),
        available_seats: 12,
        stops: None,
        boarding_point: Some("Berger Bus Stop".to_string()),
        deboarding_point: Some("Lekki Phase 1".to_string()),
        total_stops: Some(11),
    }
}

#[cfg(test)]
pub(crate) fn sample_passenger() -> PassengerDetails {
    PassengerDetails {
        name: "Ada Obi".to_string(),
        age: "29".to_string(),
        gender: "female".to_string(),
        email: "ada@example.com".to_string(),
        phone_number: "08031234567".to_string(),
        boarding_point: "Ogudu".to_string(),
        deboarding_point: "Bonny Camp".to_string(),
        subscribe_to_updates: true,
        receive_alerts: false,
    }
}
