//! Hosted collaborators the booking core talks to.

pub mod auth;
pub mod realtime;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    BusTracking, NotificationKind, ProfileUpdate, Route, RouteSubscription, Ticket, TicketStatus, UserProfile,
};
use crate::utils::jwt;

pub use auth::HostedAuth;
pub use realtime::TrackingFeed;
pub use store::DbStore;

/// Signed-in identity returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    /// Stored on the profile row only; the auth service never sees it.
    pub emergency_contact: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> AppResult<AuthSession>;

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    async fn sign_out(&self, session: &AuthSession) -> AppResult<()>;

    async fn send_password_reset(&self, email: &str) -> AppResult<()>;

    async fn update_password(&self, session: &AuthSession, password: &str) -> AppResult<()>;

    /// Session carried by a password recovery link.
    fn session_from_recovery(&self, access_token: &str) -> AppResult<AuthSession> {
        let claims = jwt::read_claims(access_token)?;
        Ok(AuthSession {
            user_id: claims.sub,
            email: claims.email.unwrap_or_default(),
            access_token: access_token.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub route_id: Uuid,
    pub passenger_name: String,
    pub passenger_age: Option<i32>,
    pub passenger_gender: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub boarding_point: String,
    pub deboarding_point: String,
    pub booking_date: NaiveDate,
    pub total_fare: i64,
    pub ticket_number: String,
    pub status: TicketStatus,
    pub delay_minutes: Option<i32>,
    pub subscribe_to_updates: bool,
    pub receive_alerts: bool,
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub route_id: Option<Uuid>,
    pub from_location: String,
    pub to_location: String,
    pub duration_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub discount: u32,
}

#[derive(Debug, Clone)]
pub struct NewSupportMessage {
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub subject: String,
    pub message: String,
}

/// Relational store, scoped to the signed-in user where rows have an owner.
#[async_trait]
pub trait Store: Send + Sync {
    /// Routes whose origin and destination match exactly.
    async fn find_routes(&self, from: &str, to: &str) -> AppResult<Vec<Route>>;

    /// Every route, oldest first.
    async fn list_routes(&self) -> AppResult<Vec<Route>>;

    /// Returns the id of the new booking row.
    async fn create_booking(&self, booking: NewBooking) -> AppResult<Uuid>;

    /// Stores every row or none of them. Ids come back in input order.
    async fn create_bookings(&self, bookings: Vec<NewBooking>) -> AppResult<Vec<Uuid>>;

    /// Newest travel date first.
    async fn list_bookings(&self, user_id: Uuid) -> AppResult<Vec<Ticket>>;

    async fn create_subscription(&self, subscription: NewSubscription) -> AppResult<RouteSubscription>;

    /// Active subscriptions, newest first.
    async fn list_subscriptions(&self, user_id: Uuid) -> AppResult<Vec<RouteSubscription>>;

    async fn deactivate_subscription(&self, user_id: Uuid, subscription_id: Uuid) -> AppResult<()>;

    async fn load_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Insert or update the editable profile fields.
    async fn save_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> AppResult<()>;

    /// Adds `amount` to the wallet and returns the new balance.
    async fn credit_wallet(&self, user_id: Uuid, amount: i64) -> AppResult<i64>;

    async fn send_support_message(&self, message: NewSupportMessage) -> AppResult<()>;

    async fn tracking_for(&self, booking_id: Uuid) -> AppResult<Option<BusTracking>>;

    async fn set_tracking_notification(
        &self,
        tracking_id: Uuid,
        kind: NotificationKind,
        enabled: bool,
    ) -> AppResult<()>;
}

/// Everything an effect needs to reach the outside world.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn Store>,
    pub payment_delay: Duration,
    pub tracking_poll_interval: Duration,
}
