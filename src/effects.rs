//! Backend requests issued by screens, and what came back.
//!
//! Screens never await anything themselves: they return an [`Effect`], the
//! session runs it against [`Services`] and hands the [`Outcome`] back to the
//! screen that asked, provided that screen is still mounted.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    BookingDetails, HybridBooking, NotificationKind, ProfileUpdate, Route, RouteSubscription, SubscriptionQuote,
    Ticket, UserProfile,
};
use crate::navigation::intent::{
    self, draw_ticket_status, IssuedBooking, PaymentReceipt, HYBRID_TICKET_DELAY_PROBABILITY,
    SINGLE_TICKET_DELAY_PROBABILITY,
};
use crate::services::{
    AuthSession, NewBooking, NewSubscription, NewSupportMessage, Services, SignUpRequest, TrackingFeed,
};
use crate::utils::{dates, pricing};

/// Passenger name used on multi-day tickets when the profile has none.
const HYBRID_PASSENGER_FALLBACK: &str = "Hybrid Worker";

#[derive(Debug, Clone)]
pub enum Effect {
    SignIn { email: String, password: String },
    SignUp(SignUpRequest),
    SendPasswordReset { email: String },
    RecoverSession { access_token: String },
    UpdatePassword { session: AuthSession, password: String },
    SignOut,
    LoadProfile,
    /// Profile, active subscriptions and the route catalogue in one go.
    LoadAccount,
    SearchRoutes { from: String, to: String, date: NaiveDate },
    FindRoutes { from: String, to: String },
    LoadRoutes,
    PayBooking(BookingDetails),
    PayHybrid(HybridBooking),
    PaySubscription(SubscriptionQuote),
    LoadTrips,
    SaveProfile(ProfileUpdate),
    FundWallet(i64),
    SendSupport { subject: String, message: String },
    Unsubscribe(Uuid),
    OpenTracking(Uuid),
    SetNotification { tracking_id: Uuid, kind: NotificationKind, enabled: bool },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::SignIn { .. } => "sign_in",
            Effect::SignUp(_) => "sign_up",
            Effect::SendPasswordReset { .. } => "send_password_reset",
            Effect::RecoverSession { .. } => "recover_session",
            Effect::UpdatePassword { .. } => "update_password",
            Effect::SignOut => "sign_out",
            Effect::LoadProfile => "load_profile",
            Effect::LoadAccount => "load_account",
            Effect::SearchRoutes { .. } => "search_routes",
            Effect::FindRoutes { .. } => "find_routes",
            Effect::LoadRoutes => "load_routes",
            Effect::PayBooking(_) => "pay_booking",
            Effect::PayHybrid(_) => "pay_hybrid",
            Effect::PaySubscription(_) => "pay_subscription",
            Effect::LoadTrips => "load_trips",
            Effect::SaveProfile(_) => "save_profile",
            Effect::FundWallet(_) => "fund_wallet",
            Effect::SendSupport { .. } => "send_support",
            Effect::Unsubscribe(_) => "unsubscribe",
            Effect::OpenTracking(_) => "open_tracking",
            Effect::SetNotification { .. } => "set_notification",
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    SignedIn(AuthSession),
    /// Account created, e-mail confirmation pending.
    SignedUp,
    ResetLinkSent,
    RecoverySession(AuthSession),
    PasswordUpdated,
    SignedOut,
    Profile {
        profile: Option<UserProfile>,
        subscriptions: Vec<RouteSubscription>,
    },
    Account {
        profile: Option<UserProfile>,
        subscriptions: Vec<RouteSubscription>,
        routes: Vec<Route>,
    },
    SearchResults { routes: Vec<Route>, date: NaiveDate },
    Routes(Vec<Route>),
    Paid(PaymentReceipt),
    HybridPaid(Vec<Ticket>),
    Subscribed(RouteSubscription),
    Trips(Vec<Ticket>),
    ProfileSaved(ProfileUpdate),
    WalletFunded { amount: i64, balance: i64 },
    SupportSent,
    Unsubscribed(Uuid),
    Tracking(TrackingFeed),
    NotificationSet { kind: NotificationKind, enabled: bool },
    Failed(String),
}

/// Session data an effect may read, copied when the effect is issued.
#[derive(Debug, Clone, Default)]
pub struct EffectEnv {
    pub session: Option<AuthSession>,
    pub profile: UserProfile,
}

impl EffectEnv {
    fn user_id(&self) -> AppResult<Uuid> {
        self.session
            .as_ref()
            .map(|s| s.user_id)
            .ok_or_else(|| AppError::Unauthorized("Please sign in again".to_string()))
    }
}

/// Run `effect`. Failures are logged here and come back as
/// [`Outcome::Failed`] carrying a message fit for a banner.
pub async fn run(effect: Effect, services: &Services, env: &EffectEnv) -> Outcome {
    let name = effect.name();
    match perform(effect, services, env).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(effect = name, error = %e, "Backend call failed");
            Outcome::Failed(user_message(&e))
        }
    }
}

pub fn user_message(error: &AppError) -> String {
    match error {
        AppError::Validation(m)
        | AppError::NotFound(m)
        | AppError::Unauthorized(m)
        | AppError::Forbidden(m)
        | AppError::Conflict(m)
        | AppError::BadRequest(m) => m.clone(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

async fn perform(effect: Effect, services: &Services, env: &EffectEnv) -> AppResult<Outcome> {
    let store = &services.store;
    let auth = &services.auth;

    match effect {
        Effect::SignIn { email, password } => Ok(Outcome::SignedIn(auth.sign_in(&email, &password).await?)),
        Effect::SignUp(request) => {
            let session = auth.sign_up(&request).await?;
            let profile = ProfileUpdate {
                full_name: request.full_name.clone(),
                phone_number: request.phone_number.clone(),
                email: request.email.clone(),
                emergency_contact: request.emergency_contact.clone(),
            };
            store.save_profile(session.user_id, &profile).await?;
            if session.access_token.is_empty() {
                Ok(Outcome::SignedUp)
            } else {
                Ok(Outcome::SignedIn(session))
            }
        }
        Effect::SendPasswordReset { email } => {
            auth.send_password_reset(&email).await?;
            Ok(Outcome::ResetLinkSent)
        }
        Effect::RecoverSession { access_token } => {
            Ok(Outcome::RecoverySession(auth.session_from_recovery(&access_token)?))
        }
        Effect::UpdatePassword { session, password } => {
            auth.update_password(&session, &password).await?;
            Ok(Outcome::PasswordUpdated)
        }
        Effect::SignOut => {
            if let Some(session) = &env.session {
                // the local session ends either way
                if let Err(e) = auth.sign_out(session).await {
                    tracing::warn!(user_id = %session.user_id, error = %e, "Remote sign-out failed");
                }
            }
            Ok(Outcome::SignedOut)
        }
        Effect::LoadProfile => {
            let user_id = env.user_id()?;
            let profile = store.load_profile(user_id).await?;
            let subscriptions = store.list_subscriptions(user_id).await?;
            Ok(Outcome::Profile { profile, subscriptions })
        }
        Effect::LoadAccount => {
            let user_id = env.user_id()?;
            let profile = store.load_profile(user_id).await?;
            let subscriptions = store.list_subscriptions(user_id).await?;
            let routes = store.list_routes().await?;
            Ok(Outcome::Account { profile, subscriptions, routes })
        }
        Effect::SearchRoutes { from, to, date } => {
            let routes = store.find_routes(&from, &to).await?;
            tracing::debug!(%from, %to, %date, found = routes.len(), "Route search");
            Ok(Outcome::SearchResults { routes, date })
        }
        Effect::FindRoutes { from, to } => Ok(Outcome::Routes(store.find_routes(&from, &to).await?)),
        Effect::LoadRoutes => Ok(Outcome::Routes(store.list_routes().await?)),
        Effect::PayBooking(booking) => pay_booking(booking, services, env).await,
        Effect::PayHybrid(booking) => pay_hybrid(booking, services, env).await,
        Effect::PaySubscription(quote) => {
            let user_id = env.user_id()?;
            tokio::time::sleep(services.payment_delay).await;

            let (start_date, end_date) = quote.period(dates::today());
            let subscription = store
                .create_subscription(NewSubscription {
                    user_id,
                    route_id: Some(quote.route.id),
                    from_location: quote.route.from.clone(),
                    to_location: quote.route.to.clone(),
                    duration_weeks: quote.duration_weeks(),
                    start_date,
                    end_date,
                    discount: quote.fare.discount_percent,
                })
                .await?;
            Ok(Outcome::Subscribed(subscription))
        }
        Effect::LoadTrips => Ok(Outcome::Trips(store.list_bookings(env.user_id()?).await?)),
        Effect::SaveProfile(update) => {
            store.save_profile(env.user_id()?, &update).await?;
            Ok(Outcome::ProfileSaved(update))
        }
        Effect::FundWallet(amount) => {
            let balance = store.credit_wallet(env.user_id()?, amount).await?;
            Ok(Outcome::WalletFunded { amount, balance })
        }
        Effect::SendSupport { subject, message } => {
            store
                .send_support_message(NewSupportMessage {
                    user_id: env.user_id()?,
                    user_email: env.profile.email.clone(),
                    user_name: env.profile.full_name.clone(),
                    subject,
                    message,
                })
                .await?;
            Ok(Outcome::SupportSent)
        }
        Effect::Unsubscribe(subscription_id) => {
            store.deactivate_subscription(env.user_id()?, subscription_id).await?;
            Ok(Outcome::Unsubscribed(subscription_id))
        }
        Effect::OpenTracking(booking_id) => {
            let feed = TrackingFeed::open(store.clone(), booking_id, services.tracking_poll_interval).await?;
            Ok(Outcome::Tracking(feed))
        }
        Effect::SetNotification { tracking_id, kind, enabled } => {
            store.set_tracking_notification(tracking_id, kind, enabled).await?;
            Ok(Outcome::NotificationSet { kind, enabled })
        }
    }
}

async fn pay_booking(booking: BookingDetails, services: &Services, env: &EffectEnv) -> AppResult<Outcome> {
    let user_id = env.user_id()?;
    tokio::time::sleep(services.payment_delay).await;

    if let Some(terms) = booking.subscription {
        let discount = pricing::weekly_subscription_fare(booking.route.price, terms.duration_weeks).discount_percent;
        let subscription = services
            .store
            .create_subscription(NewSubscription {
                user_id,
                route_id: Some(booking.route.id),
                from_location: booking.route.from.clone(),
                to_location: booking.route.to.clone(),
                duration_weeks: terms.duration_weeks,
                start_date: terms.start_date,
                end_date: terms.end_date,
                discount,
            })
            .await?;
        return Ok(Outcome::Paid(PaymentReceipt::Subscribed(subscription)));
    }

    let passenger_age = booking
        .passenger
        .age
        .trim()
        .parse::<i32>()
        .map_err(|_| AppError::Validation("Age must be a number".to_string()))?;
    let issued_at = Utc::now();
    let ticket_number = intent::ticket_number("MB", issued_at, 8);
    let (status, delay_minutes) = draw_ticket_status(&mut rand::thread_rng(), SINGLE_TICKET_DELAY_PROBABILITY);

    let booking_id = services
        .store
        .create_booking(NewBooking {
            user_id,
            route_id: booking.route.id,
            passenger_name: booking.passenger.name.clone(),
            passenger_age: Some(passenger_age),
            passenger_gender: booking.passenger.gender.clone(),
            passenger_email: booking.passenger.email.clone(),
            passenger_phone: booking.passenger.phone_number.clone(),
            boarding_point: booking.boarding_point.clone(),
            deboarding_point: booking.deboarding_point.clone(),
            booking_date: booking.date,
            total_fare: booking.total_fare,
            ticket_number: ticket_number.clone(),
            status,
            delay_minutes,
            subscribe_to_updates: booking.passenger.subscribe_to_updates,
            receive_alerts: booking.passenger.receive_alerts,
        })
        .await?;

    Ok(Outcome::Paid(PaymentReceipt::Booked(IssuedBooking {
        booking_id,
        ticket_number,
        status,
        delay_minutes,
        issued_at,
    })))
}

/// One booking row and one ticket per chosen date.
async fn pay_hybrid(booking: HybridBooking, services: &Services, env: &EffectEnv) -> AppResult<Outcome> {
    let user_id = env.user_id()?;
    if booking.dates.is_empty() {
        return Err(AppError::Validation("Select at least one travel date".to_string()));
    }
    tokio::time::sleep(services.payment_delay).await;

    let issued_at = Utc::now();
    let fares = pricing::split_fare(booking.fare.total, booking.dates.len());
    let statuses: Vec<_> = {
        let mut rng = rand::thread_rng();
        booking
            .dates
            .iter()
            .map(|_| draw_ticket_status(&mut rng, HYBRID_TICKET_DELAY_PROBABILITY))
            .collect()
    };
    let passenger_name = match env.profile.full_name.trim() {
        "" => HYBRID_PASSENGER_FALLBACK.to_string(),
        name => name.to_string(),
    };
    let number_stem = intent::ticket_number("HB", issued_at, 6);
    let barcode_stem = intent::barcode("HB", issued_at);

    let mut rows = Vec::with_capacity(booking.dates.len());
    let mut tickets = Vec::with_capacity(booking.dates.len());
    for (index, ((date, fare), (status, delay_minutes))) in
        booking.dates.iter().zip(fares).zip(statuses).enumerate()
    {
        let ticket_number = format!("{}{}", number_stem, index);
        rows.push(NewBooking {
            user_id,
            route_id: booking.route.id,
            passenger_name: passenger_name.clone(),
            passenger_age: None,
            passenger_gender: String::new(),
            passenger_email: env.profile.email.clone(),
            passenger_phone: env.profile.phone_number.clone(),
            boarding_point: booking.boarding_point.clone(),
            deboarding_point: booking.deboarding_point.clone(),
            booking_date: *date,
            total_fare: fare,
            ticket_number: ticket_number.clone(),
            status,
            delay_minutes,
            subscribe_to_updates: false,
            receive_alerts: false,
        });
        tickets.push(Ticket {
            id: String::new(),
            ticket_number,
            passenger_name: passenger_name.clone(),
            route: booking.route.label(),
            boarding_time: booking.route.departure_time.clone(),
            boarding_point: booking.boarding_point.clone(),
            deboarding_point: booking.deboarding_point.clone(),
            date: *date,
            status,
            delay_minutes,
            barcode: format!("{}{}", barcode_stem, index),
        });
    }

    // One transaction for every date
    let booking_ids = services.store.create_bookings(rows).await?;
    if booking_ids.len() != tickets.len() {
        return Err(AppError::Internal(format!(
            "stored {} of {} bookings",
            booking_ids.len(),
            tickets.len()
        )));
    }
    for (ticket, booking_id) in tickets.iter_mut().zip(booking_ids) {
        ticket.id = booking_id.to_string();
    }

    tracing::info!(%user_id, tickets = tickets.len(), total = booking.fare.total, "Hybrid booking paid");
    Ok(Outcome::HybridPaid(tickets))
}
