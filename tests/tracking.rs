mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use metro_commute::models::{NotificationKind, TrackingStatus};
use metro_commute::navigation::Screen;
use metro_commute::screens::home::HomeAction;
use metro_commute::screens::passenger_details::{PassengerAction, PassengerInput};
use metro_commute::screens::payment::PaymentAction;
use metro_commute::screens::search_results::ResultsAction;
use metro_commute::screens::tickets::TicketAction;
use metro_commute::screens::tracking::TrackingAction;
use metro_commute::screens::{Action, ScreenBody};
use metro_commute::services::{Store, TrackingFeed};
use metro_commute::{AppState, Session};

use support::{config, seeded_store, services, signed_in, stored_tracking, MemoryStore};

/// Books the first route and leaves the session on its ticket.
async fn booked(store: Arc<MemoryStore>) -> (Session, Uuid) {
    let session = signed_in(store.clone()).await;
    session
        .dispatch(Action::Search(HomeAction::QuickRoute {
            from: "Berger".to_string(),
            to: "Lekki Phase 1".to_string(),
        }))
        .await;
    session.dispatch(Action::Search(HomeAction::ViewAll)).await;
    session
        .dispatch(Action::Results(ResultsAction::Select {
            route_id: Uuid::from_u128(1),
        }))
        .await;
    session
        .dispatch(Action::Passenger(PassengerAction::Submit(PassengerInput {
            age: "34".to_string(),
            gender: "male".to_string(),
            phone_number: "08031234567".to_string(),
            boarding_point: "Alapere".to_string(),
            deboarding_point: "Lekki Phase 1".to_string(),
            subscribe_to_updates: false,
            receive_alerts: true,
        })))
        .await;
    let view = session.dispatch(Action::Payment(PaymentAction::Confirm)).await;
    assert_eq!(view.screen, Screen::Ticket);
    let booking_id = store.booking_ids()[0];
    (session, booking_id)
}

#[tokio::test]
async fn test_feed_stops_polling_after_leaving_screen() {
    let store = seeded_store();
    let (session, booking_id) = booked(store.clone()).await;
    store.put_tracking(booking_id, stored_tracking(900));

    let view = session.dispatch(Action::Ticket(TicketAction::TrackBus)).await;
    let ScreenBody::TrackBus(tracking) = view.body else {
        panic!("expected tracking, got {:?}", view.screen);
    };
    assert!(tracking.live);
    assert_eq!(tracking.tracking.id, Some(Uuid::from_u128(900)));

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(store.tracking_reads() > 1);

    let view = session.dispatch(Action::Back).await;
    assert_eq!(view.screen, Screen::Ticket);

    tokio::time::sleep(Duration::from_millis(30)).await;
    let reads = store.tracking_reads();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(store.tracking_reads(), reads);
}

#[tokio::test]
async fn test_failed_toggle_is_reverted() {
    let store = seeded_store();
    let (session, booking_id) = booked(store.clone()).await;
    store.put_tracking(booking_id, stored_tracking(901));
    session.dispatch(Action::Ticket(TicketAction::TrackBus)).await;

    store.fail_notifications.store(true, Ordering::SeqCst);
    let view = session
        .dispatch(Action::Tracking(TrackingAction::ToggleNotification {
            kind: NotificationKind::Delay,
        }))
        .await;
    let ScreenBody::TrackBus(tracking) = view.body else {
        panic!("expected tracking");
    };
    assert!(tracking.tracking.notify_delay);
    assert!(tracking.banner.error.is_some());

    store.fail_notifications.store(false, Ordering::SeqCst);
    let view = session
        .dispatch(Action::Tracking(TrackingAction::ToggleNotification {
            kind: NotificationKind::TenMinutes,
        }))
        .await;
    let ScreenBody::TrackBus(tracking) = view.body else {
        panic!("expected tracking");
    };
    assert!(!tracking.tracking.notify_10min);
    session.close().await;
}

#[tokio::test]
async fn test_preferences_follow_changes_made_elsewhere() {
    let store = seeded_store();
    let (session, booking_id) = booked(store.clone()).await;
    store.put_tracking(booking_id, stored_tracking(903));
    let view = session.dispatch(Action::Ticket(TicketAction::TrackBus)).await;
    let ScreenBody::TrackBus(tracking) = view.body else {
        panic!("expected tracking, got {:?}", view.screen);
    };
    assert!(tracking.tracking.notify_10min);

    let mut muted = stored_tracking(903);
    muted.notify_10min = false;
    store.put_tracking(booking_id, muted);
    tokio::time::sleep(Duration::from_millis(120)).await;

    let ScreenBody::TrackBus(tracking) = session.view().await.body else {
        panic!("expected tracking");
    };
    assert!(!tracking.tracking.notify_10min);

    // Toggling starts from the stored value, not the stale local one
    let view = session
        .dispatch(Action::Tracking(TrackingAction::ToggleNotification {
            kind: NotificationKind::TenMinutes,
        }))
        .await;
    let ScreenBody::TrackBus(tracking) = view.body else {
        panic!("expected tracking");
    };
    assert!(tracking.tracking.notify_10min);
    session.close().await;
}

#[tokio::test]
async fn test_idle_session_sweep_releases_feed() {
    let store = seeded_store();
    let (session, booking_id) = booked(store.clone()).await;
    store.put_tracking(booking_id, stored_tracking(904));
    session.dispatch(Action::Ticket(TicketAction::TrackBus)).await;

    let state = AppState::new(services(store.clone()), config());
    state
        .sessions
        .write()
        .await
        .insert("idle-client".to_string(), Arc::new(session));

    assert_eq!(state.sweep_idle_sessions(Duration::from_secs(1800)).await, 0);
    assert_eq!(state.sessions.read().await.len(), 1);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(state.sweep_idle_sessions(Duration::from_millis(50)).await, 1);
    assert!(state.sessions.read().await.is_empty());

    tokio::time::sleep(Duration::from_millis(30)).await;
    let reads = store.tracking_reads();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(store.tracking_reads(), reads);
}

#[tokio::test]
async fn test_feed_publishes_row_changes() {
    let store = seeded_store();
    let booking_id = Uuid::from_u128(42);
    store.put_tracking(booking_id, stored_tracking(902));

    let shared: Arc<dyn Store> = store.clone();
    let mut feed = TrackingFeed::open(shared, booking_id, Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(feed.booking_id(), booking_id);
    assert_eq!(feed.latest().status, TrackingStatus::EnRoute);

    let mut delayed = stored_tracking(902);
    delayed.status = TrackingStatus::Delayed;
    delayed.eta_minutes = 25;
    store.put_tracking(booking_id, delayed);

    let changed = tokio::time::timeout(Duration::from_secs(1), feed.changed()).await.unwrap();
    assert!(changed);
    assert_eq!(feed.latest().status, TrackingStatus::Delayed);
    assert_eq!(feed.latest().eta_minutes, 25);
}
