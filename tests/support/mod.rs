//! In-memory stand-ins for the hosted auth service and the store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use metro_commute::error::{AppError, AppResult};
use metro_commute::models::{
    BusTracking, NotificationKind, ProfileUpdate, Route, RouteSubscription, Ticket, UserProfile,
};
use metro_commute::screens::auth::LoginAction;
use metro_commute::screens::Action;
use metro_commute::services::{
    AuthProvider, AuthSession, NewBooking, NewSubscription, NewSupportMessage, Services, SignUpRequest, Store,
};
use metro_commute::utils::dates;
use metro_commute::{Config, Session};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "secret1";

#[derive(Default)]
pub struct FakeAuth {
    users: Mutex<HashMap<String, (Uuid, String)>>,
}

impl FakeAuth {
    pub fn with_user(email: &str, password: &str, user_id: Uuid) -> Self {
        let auth = Self::default();
        auth.users
            .lock()
            .unwrap()
            .insert(email.to_string(), (user_id, password.to_string()));
        auth
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(&self, request: &SignUpRequest) -> AppResult<AuthSession> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&request.email) {
            return Err(AppError::Conflict("User already registered".to_string()));
        }
        let user_id = Uuid::new_v4();
        users.insert(request.email.clone(), (user_id, request.password.clone()));
        Ok(AuthSession {
            user_id,
            email: request.email.clone(),
            access_token: format!("token-{}", user_id),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        match self.users.lock().unwrap().get(email) {
            Some((user_id, stored)) if stored == password => Ok(AuthSession {
                user_id: *user_id,
                email: email.to_string(),
                access_token: format!("token-{}", user_id),
            }),
            _ => Err(AppError::Unauthorized("Invalid login credentials".to_string())),
        }
    }

    async fn sign_out(&self, _session: &AuthSession) -> AppResult<()> {
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str) -> AppResult<()> {
        Ok(())
    }

    async fn update_password(&self, session: &AuthSession, password: &str) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let entry = users
            .get_mut(&session.email)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        entry.1 = password.to_string();
        Ok(())
    }
}

#[derive(Default)]
struct Tables {
    routes: Vec<Route>,
    bookings: Vec<(Uuid, NewBooking)>,
    subscriptions: Vec<(Uuid, RouteSubscription)>,
    profiles: HashMap<Uuid, UserProfile>,
    support: Vec<NewSupportMessage>,
    tracking: HashMap<Uuid, BusTracking>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub tracking_reads: AtomicUsize,
    pub fail_notifications: std::sync::atomic::AtomicBool,
    /// Rejects a batch insert when it reaches this row.
    pub fail_batch_at: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn with_routes(routes: Vec<Route>) -> Self {
        let store = Self::default();
        store.tables.lock().unwrap().routes = routes;
        store
    }

    pub fn put_profile(&self, user_id: Uuid, profile: UserProfile) {
        self.tables.lock().unwrap().profiles.insert(user_id, profile);
    }

    pub fn put_tracking(&self, booking_id: Uuid, tracking: BusTracking) {
        self.tables.lock().unwrap().tracking.insert(booking_id, tracking);
    }

    pub fn bookings(&self) -> Vec<NewBooking> {
        self.tables
            .lock()
            .unwrap()
            .bookings
            .iter()
            .map(|(_, b)| b.clone())
            .collect()
    }

    pub fn booking_ids(&self) -> Vec<Uuid> {
        self.tables.lock().unwrap().bookings.iter().map(|(id, _)| *id).collect()
    }

    pub fn subscriptions(&self) -> Vec<RouteSubscription> {
        self.tables
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn support_messages(&self) -> Vec<NewSupportMessage> {
        self.tables.lock().unwrap().support.clone()
    }

    pub fn tracking_reads(&self) -> usize {
        self.tracking_reads.load(Ordering::SeqCst)
    }

    fn label(&self, route_id: Uuid) -> (String, String) {
        let tables = self.tables.lock().unwrap();
        tables
            .routes
            .iter()
            .find(|r| r.id == route_id)
            .map(|r| (r.label(), r.departure_time.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_routes(&self, from: &str, to: &str) -> AppResult<Vec<Route>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .routes
            .iter()
            .filter(|r| r.from == from && r.to == to)
            .cloned()
            .collect())
    }

    async fn list_routes(&self) -> AppResult<Vec<Route>> {
        Ok(self.tables.lock().unwrap().routes.clone())
    }

    async fn create_booking(&self, booking: NewBooking) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        let mut tables = self.tables.lock().unwrap();
        if tables.bookings.iter().any(|(_, b)| b.ticket_number == booking.ticket_number) {
            return Err(AppError::Conflict("Duplicate ticket number".to_string()));
        }
        tables.bookings.push((id, booking));
        Ok(id)
    }

    async fn create_bookings(&self, bookings: Vec<NewBooking>) -> AppResult<Vec<Uuid>> {
        let fail_at = *self.fail_batch_at.lock().unwrap();
        let mut tables = self.tables.lock().unwrap();
        let mut staged: Vec<(Uuid, NewBooking)> = Vec::with_capacity(bookings.len());
        for (index, booking) in bookings.into_iter().enumerate() {
            if fail_at == Some(index) {
                return Err(AppError::Backend("connection reset".to_string()));
            }
            let duplicate = tables
                .bookings
                .iter()
                .chain(staged.iter())
                .any(|(_, b)| b.ticket_number == booking.ticket_number);
            if duplicate {
                return Err(AppError::Conflict("Duplicate ticket number".to_string()));
            }
            staged.push((Uuid::new_v4(), booking));
        }
        let ids = staged.iter().map(|(id, _)| *id).collect();
        tables.bookings.extend(staged);
        Ok(ids)
    }

    async fn list_bookings(&self, user_id: Uuid) -> AppResult<Vec<Ticket>> {
        let rows: Vec<(Uuid, NewBooking)> = {
            let tables = self.tables.lock().unwrap();
            tables
                .bookings
                .iter()
                .filter(|(_, b)| b.user_id == user_id)
                .cloned()
                .collect()
        };
        let mut tickets: Vec<Ticket> = rows
            .into_iter()
            .map(|(id, b)| {
                let (route, boarding_time) = self.label(b.route_id);
                Ticket {
                    id: id.to_string(),
                    barcode: b.ticket_number.clone(),
                    ticket_number: b.ticket_number,
                    passenger_name: b.passenger_name,
                    route,
                    boarding_time,
                    boarding_point: b.boarding_point,
                    deboarding_point: b.deboarding_point,
                    date: b.booking_date,
                    status: b.status,
                    delay_minutes: b.delay_minutes,
                }
            })
            .collect();
        tickets.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(tickets)
    }

    async fn create_subscription(&self, subscription: NewSubscription) -> AppResult<RouteSubscription> {
        let row = RouteSubscription {
            id: Uuid::new_v4(),
            route: format!("{} → {}", subscription.from_location, subscription.to_location),
            duration_weeks: subscription.duration_weeks,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            discount: subscription.discount,
            is_active: true,
        };
        self.tables
            .lock()
            .unwrap()
            .subscriptions
            .push((subscription.user_id, row.clone()));
        Ok(row)
    }

    async fn list_subscriptions(&self, user_id: Uuid) -> AppResult<Vec<RouteSubscription>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .subscriptions
            .iter()
            .rev()
            .filter(|(owner, s)| *owner == user_id && s.is_active)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn deactivate_subscription(&self, user_id: Uuid, subscription_id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .subscriptions
            .iter_mut()
            .find(|(owner, s)| *owner == user_id && s.id == subscription_id)
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;
        row.1.is_active = false;
        Ok(())
    }

    async fn load_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.tables.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn save_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let profile = tables.profiles.entry(user_id).or_default();
        profile.full_name = update.full_name.clone();
        profile.phone_number = update.phone_number.clone();
        profile.email = update.email.clone();
        profile.emergency_contact = update.emergency_contact.clone();
        Ok(())
    }

    async fn credit_wallet(&self, user_id: Uuid, amount: i64) -> AppResult<i64> {
        let mut tables = self.tables.lock().unwrap();
        let profile = tables.profiles.entry(user_id).or_default();
        profile.wallet_balance += amount;
        Ok(profile.wallet_balance)
    }

    async fn send_support_message(&self, message: NewSupportMessage) -> AppResult<()> {
        self.tables.lock().unwrap().support.push(message);
        Ok(())
    }

    async fn tracking_for(&self, booking_id: Uuid) -> AppResult<Option<BusTracking>> {
        self.tracking_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables.lock().unwrap().tracking.get(&booking_id).cloned())
    }

    async fn set_tracking_notification(
        &self,
        tracking_id: Uuid,
        kind: NotificationKind,
        enabled: bool,
    ) -> AppResult<()> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::Backend("tracking update rejected".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .tracking
            .values_mut()
            .find(|t| t.id == Some(tracking_id))
            .ok_or_else(|| AppError::NotFound("Tracking not found".to_string()))?;
        match kind {
            NotificationKind::TenMinutes => row.notify_10min = enabled,
            NotificationKind::Delay => row.notify_delay = enabled,
        }
        Ok(())
    }
}

pub fn route(n: u128, from: &str, to: &str, price: i64) -> Route {
    Route {
        id: Uuid::from_u128(n),
        from: from.to_string(),
        to: to.to_string(),
        duration: "2h 10m".to_string(),
        price,
        departure_time: "05:40".to_string(),
        arrival_time: "07:50".to_string(),
        available_seats: 14,
        stops: None,
        boarding_point: None,
        deboarding_point: None,
        total_stops: None,
    }
}

pub fn catalogue() -> Vec<Route> {
    vec![
        route(1, "Berger", "Lekki Phase 1", 2400),
        route(2, "Ikorodu", "Lekki Phase 1", 2800),
        route(3, "TBS", "Ikorodu", 2000),
    ]
}

pub fn user_id() -> Uuid {
    Uuid::from_u128(500)
}

pub fn services(store: Arc<MemoryStore>) -> Services {
    Services {
        auth: Arc::new(FakeAuth::with_user(EMAIL, PASSWORD, user_id())),
        store,
        payment_delay: Duration::ZERO,
        tracking_poll_interval: Duration::from_millis(20),
    }
}

pub fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::with_routes(catalogue());
    store.put_profile(
        user_id(),
        UserProfile {
            full_name: "Ada Obi".to_string(),
            phone_number: "08031234567".to_string(),
            email: EMAIL.to_string(),
            wallet_balance: 1500,
            ..Default::default()
        },
    );
    Arc::new(store)
}

pub fn login() -> Action {
    Action::Login(LoginAction::Submit {
        email: EMAIL.to_string(),
        password: PASSWORD.to_string(),
    })
}

/// Session already past the login screen.
pub async fn signed_in(store: Arc<MemoryStore>) -> Session {
    let session = Session::new(services(store));
    session.dispatch(login()).await;
    session
}

/// `count` working days starting the Monday after today.
pub fn upcoming_working_days(count: usize) -> Vec<NaiveDate> {
    let mut monday = dates::today() + Days::new(1);
    while monday.weekday() != Weekday::Mon {
        monday = monday + Days::new(1);
    }
    let mut days = Vec::new();
    let mut day = monday;
    while days.len() < count {
        if dates::is_working_day(day) {
            days.push(day);
        }
        day = day + Days::new(1);
    }
    days
}

pub fn stored_tracking(id: u128) -> BusTracking {
    BusTracking {
        id: Some(Uuid::from_u128(id)),
        ..BusTracking::placeholder(Utc::now())
    }
}

pub fn config() -> Config {
    Config {
        backend_url: "http://localhost:54321".to_string(),
        backend_anon_key: "anon".to_string(),
        database_url: "postgres://localhost/metro_commute".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        payment_delay: Duration::ZERO,
        tracking_poll_interval: Duration::from_millis(20),
        session_idle_timeout: Duration::from_secs(1800),
    }
}
