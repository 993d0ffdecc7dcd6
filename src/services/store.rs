//! [`Store`] backed by the relational tables of the hosted backend.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{booking, bus_tracking, route, route_subscription, support_message, user_profile};
use crate::error::{AppError, AppResult};
use crate::models::{
    BusTracking, NotificationKind, ProfileUpdate, Route, RouteSubscription, Ticket, UserProfile, PREFERRED_ROUTES,
};
use crate::services::{NewBooking, NewSubscription, NewSupportMessage, Store};

pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn booking_row(new: NewBooking) -> booking::ActiveModel {
    booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(new.user_id)),
        route_id: Set(new.route_id),
        passenger_name: Set(new.passenger_name),
        passenger_age: Set(new.passenger_age),
        passenger_gender: Set(new.passenger_gender),
        passenger_email: Set(new.passenger_email),
        passenger_phone: Set(new.passenger_phone),
        boarding_point: Set(new.boarding_point),
        deboarding_point: Set(new.deboarding_point),
        booking_date: Set(new.booking_date),
        total_fare: Set(new.total_fare),
        ticket_number: Set(new.ticket_number),
        status: Set(new.status),
        delay_minutes: Set(new.delay_minutes),
        subscribe_to_updates: Set(new.subscribe_to_updates),
        receive_alerts: Set(new.receive_alerts),
        ..Default::default()
    }
}

impl From<route::Model> for Route {
    fn from(model: route::Model) -> Self {
        let stops: Option<Vec<String>> = model
            .stops
            .and_then(|json| serde_json::from_value(json).ok());
        Self {
            id: model.id,
            total_stops: stops.as_ref().map(|s| s.len() as i32),
            from: model.from_location,
            to: model.to_location,
            duration: model.duration,
            price: model.price,
            departure_time: model.departure_time,
            arrival_time: model.arrival_time,
            available_seats: model.available_seats,
            stops,
            boarding_point: model.boarding_point,
            deboarding_point: model.deboarding_point,
        }
    }
}

impl From<route_subscription::Model> for RouteSubscription {
    fn from(model: route_subscription::Model) -> Self {
        Self {
            id: model.id,
            route: format!("{} → {}", model.from_location, model.to_location),
            duration_weeks: model.duration_weeks.max(0) as u32,
            start_date: model.start_date,
            end_date: model.end_date,
            discount: model.discount.max(0) as u32,
            is_active: model.is_active,
        }
    }
}

impl From<bus_tracking::Model> for BusTracking {
    fn from(model: bus_tracking::Model) -> Self {
        Self {
            id: Some(model.id),
            bus_number: model.bus_number,
            driver_name: model.driver_name,
            status: model.status,
            current_stage: model.current_stage,
            distance_to_pickup_km: model.distance_to_pickup_km,
            eta_minutes: model.eta_minutes,
            last_updated: model.last_updated.with_timezone(&Utc),
            status_message: model.status_message,
            notify_10min: model.notify_10min,
            notify_delay: model.notify_delay,
        }
    }
}

fn ticket_from_row(row: booking::Model, route: Option<route::Model>) -> Ticket {
    let (label, boarding_time) = match route {
        Some(r) => (format!("{} → {}", r.from_location, r.to_location), r.departure_time),
        None => (String::new(), String::new()),
    };
    Ticket {
        id: row.id.to_string(),
        barcode: row.ticket_number.clone(),
        ticket_number: row.ticket_number,
        passenger_name: row.passenger_name,
        route: label,
        boarding_time,
        boarding_point: row.boarding_point,
        deboarding_point: row.deboarding_point,
        date: row.booking_date,
        status: row.status,
        delay_minutes: row.delay_minutes,
    }
}

#[async_trait]
impl Store for DbStore {
    async fn find_routes(&self, from: &str, to: &str) -> AppResult<Vec<Route>> {
        let rows = route::Entity::find()
            .filter(route::Column::FromLocation.eq(from))
            .filter(route::Column::ToLocation.eq(to))
            .order_by_asc(route::Column::DepartureTime)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Route::from).collect())
    }

    async fn list_routes(&self) -> AppResult<Vec<Route>> {
        let rows = route::Entity::find()
            .order_by_asc(route::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Route::from).collect())
    }

    async fn create_booking(&self, new: NewBooking) -> AppResult<Uuid> {
        let row = booking_row(new).insert(&self.db).await?;

        tracing::info!(booking_id = %row.id, ticket = %row.ticket_number, "Booking stored");
        Ok(row.id)
    }

    async fn create_bookings(&self, bookings: Vec<NewBooking>) -> AppResult<Vec<Uuid>> {
        let txn = self.db.begin().await?;
        let mut ids = Vec::with_capacity(bookings.len());
        for new in bookings {
            // Dropping txn on error rolls back the rows already inserted
            let row = booking_row(new).insert(&txn).await?;
            ids.push(row.id);
        }
        txn.commit().await?;

        tracing::info!(count = ids.len(), "Bookings stored");
        Ok(ids)
    }

    async fn list_bookings(&self, user_id: Uuid) -> AppResult<Vec<Ticket>> {
        let rows = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .find_also_related(route::Entity)
            .order_by_desc(booking::Column::BookingDate)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|(row, route)| ticket_from_row(row, route)).collect())
    }

    async fn create_subscription(&self, new: NewSubscription) -> AppResult<RouteSubscription> {
        let row = route_subscription::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            route_id: Set(new.route_id),
            from_location: Set(new.from_location),
            to_location: Set(new.to_location),
            duration_weeks: Set(new.duration_weeks as i32),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            discount: Set(new.discount as i32),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(subscription_id = %row.id, weeks = row.duration_weeks, "Subscription stored");
        Ok(row.into())
    }

    async fn list_subscriptions(&self, user_id: Uuid) -> AppResult<Vec<RouteSubscription>> {
        let rows = route_subscription::Entity::find()
            .filter(route_subscription::Column::UserId.eq(user_id))
            .filter(route_subscription::Column::IsActive.eq(true))
            .order_by_desc(route_subscription::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(RouteSubscription::from).collect())
    }

    async fn deactivate_subscription(&self, user_id: Uuid, subscription_id: Uuid) -> AppResult<()> {
        let subscription = route_subscription::Entity::find_by_id(subscription_id)
            .filter(route_subscription::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        let mut active: route_subscription::ActiveModel = subscription.into();
        active.is_active = Set(false);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn load_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let Some(row) = user_profile::Entity::find_by_id(user_id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(Some(UserProfile {
            full_name: row.full_name,
            phone_number: row.phone_number,
            email: row.email,
            emergency_contact: row.emergency_contact.unwrap_or_default(),
            preferred_routes: PREFERRED_ROUTES.iter().map(|r| r.to_string()).collect(),
            subscriptions: Vec::new(),
            wallet_balance: row.wallet_balance,
        }))
    }

    async fn save_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> AppResult<()> {
        let emergency_contact = Some(update.emergency_contact.clone()).filter(|c| !c.trim().is_empty());

        match user_profile::Entity::find_by_id(user_id).one(&self.db).await? {
            Some(existing) => {
                let mut active: user_profile::ActiveModel = existing.into();
                active.full_name = Set(update.full_name.clone());
                active.phone_number = Set(update.phone_number.clone());
                active.email = Set(update.email.clone());
                active.emergency_contact = Set(emergency_contact);
                active.updated_at = Set(Utc::now().into());
                active.update(&self.db).await?;
            }
            None => {
                user_profile::ActiveModel {
                    id: Set(user_id),
                    full_name: Set(update.full_name.clone()),
                    phone_number: Set(update.phone_number.clone()),
                    email: Set(update.email.clone()),
                    emergency_contact: Set(emergency_contact),
                    wallet_balance: Set(0),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
            }
        }
        Ok(())
    }

    async fn credit_wallet(&self, user_id: Uuid, amount: i64) -> AppResult<i64> {
        let txn = self.db.begin().await?;
        // Row lock keeps concurrent top-ups from reading the same balance
        let profile = user_profile::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        let balance = profile.wallet_balance + amount;
        let mut active: user_profile::ActiveModel = profile.into();
        active.wallet_balance = Set(balance);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;
        txn.commit().await?;

        tracing::info!(%user_id, amount, balance, "Wallet funded");
        Ok(balance)
    }

    async fn send_support_message(&self, message: NewSupportMessage) -> AppResult<()> {
        support_message::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(Some(message.user_id)),
            user_email: Set(message.user_email),
            user_name: Set(message.user_name),
            subject: Set(message.subject),
            message: Set(message.message),
            status: Set("pending".to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    async fn tracking_for(&self, booking_id: Uuid) -> AppResult<Option<BusTracking>> {
        let row = bus_tracking::Entity::find()
            .filter(bus_tracking::Column::BookingId.eq(booking_id))
            .order_by_desc(bus_tracking::Column::LastUpdated)
            .one(&self.db)
            .await?;
        Ok(row.map(BusTracking::from))
    }

    async fn set_tracking_notification(
        &self,
        tracking_id: Uuid,
        kind: NotificationKind,
        enabled: bool,
    ) -> AppResult<()> {
        let row = bus_tracking::Entity::find_by_id(tracking_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Tracking record not found".to_string()))?;

        let mut active: bus_tracking::ActiveModel = row.into();
        match kind {
            NotificationKind::TenMinutes => active.notify_10min = Set(enabled),
            NotificationKind::Delay => active.notify_delay = Set(enabled),
        }
        active.update(&self.db).await?;
        Ok(())
    }
}
