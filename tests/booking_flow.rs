mod support;

use chrono::NaiveDate;
use uuid::Uuid;

use metro_commute::navigation::Screen;
use metro_commute::screens::auth::LoginAction;
use metro_commute::screens::discover::DiscoverAction;
use metro_commute::screens::home::HomeAction;
use metro_commute::screens::hybrid::HybridAction;
use metro_commute::screens::passenger_details::{PassengerAction, PassengerInput};
use metro_commute::screens::payment::PaymentAction;
use metro_commute::screens::profile::ProfileAction;
use metro_commute::screens::search_results::ResultsAction;
use metro_commute::screens::{Action, ScreenBody};
use metro_commute::Session;

use support::{seeded_store, services, signed_in, upcoming_working_days};

fn passenger() -> PassengerInput {
    PassengerInput {
        age: "29".to_string(),
        gender: "female".to_string(),
        phone_number: "08031234567".to_string(),
        boarding_point: "Ogudu".to_string(),
        deboarding_point: "Bonny Camp".to_string(),
        subscribe_to_updates: true,
        receive_alerts: false,
    }
}

#[tokio::test]
async fn test_single_booking_issues_ticket() {
    let store = seeded_store();
    let session = signed_in(store.clone()).await;
    let view = session.view().await;
    assert_eq!(view.screen, Screen::Home);
    assert!(view.signed_in);

    let view = session
        .dispatch(Action::Search(HomeAction::QuickRoute {
            from: "Berger".to_string(),
            to: "Lekki Phase 1".to_string(),
        }))
        .await;
    let ScreenBody::Home(home) = view.body else {
        panic!("expected home, got {:?}", view.screen);
    };
    assert!(home.search_performed);
    assert_eq!(home.available.len(), 1);
    assert_eq!(home.greeting, "Hello, Ada");

    let view = session.dispatch(Action::Search(HomeAction::ViewAll)).await;
    assert_eq!(view.screen, Screen::SearchResults);

    let view = session
        .dispatch(Action::Results(ResultsAction::Select {
            route_id: Uuid::from_u128(1),
        }))
        .await;
    let ScreenBody::PassengerDetails(details) = view.body else {
        panic!("expected passenger details, got {:?}", view.screen);
    };
    assert_eq!(details.details.name, "Ada Obi");

    let view = session.dispatch(Action::Passenger(PassengerAction::Submit(passenger()))).await;
    assert_eq!(view.screen, Screen::Payment);

    let view = session.dispatch(Action::Payment(PaymentAction::Confirm)).await;
    let ScreenBody::Ticket(ticket) = view.body else {
        panic!("expected ticket, got {:?}", view.screen);
    };
    assert!(ticket.ticket.ticket_number.starts_with("MB"));
    assert_eq!(ticket.ticket.ticket_number.len(), 10);
    assert_eq!(ticket.ticket.route, "Berger → Lekki Phase 1");
    assert!(view.can_go_back);

    let bookings = store.bookings();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].total_fare, 2400);
    assert_eq!(bookings[0].passenger_age, Some(29));
    assert_eq!(ticket.ticket.id, store.booking_ids()[0].to_string());
}

#[tokio::test]
async fn test_subscription_from_discover_lands_on_profile() {
    let store = seeded_store();
    let session = signed_in(store.clone()).await;

    let view = session.dispatch(Action::Open(Screen::Discover)).await;
    let ScreenBody::Discover(discover) = view.body else {
        panic!("expected discover, got {:?}", view.screen);
    };
    assert_eq!(discover.routes.len(), 3);

    let view = session
        .dispatch(Action::Discover(DiscoverAction::Subscribe {
            route_id: Uuid::from_u128(1),
            weeks: 2,
        }))
        .await;
    let ScreenBody::PassengerDetails(details) = view.body else {
        panic!("expected passenger details, got {:?}", view.screen);
    };
    assert_eq!(details.total_fare, 2400 * 6 * 2);

    session.dispatch(Action::Passenger(PassengerAction::Submit(passenger()))).await;
    let view = session.dispatch(Action::Payment(PaymentAction::Confirm)).await;
    assert_eq!(view.screen, Screen::Profile);
    assert!(!view.can_go_back);

    let ScreenBody::Profile(profile) = view.body else {
        panic!("expected profile");
    };
    assert_eq!(profile.subscriptions.len(), 1);
    assert_eq!(profile.subscriptions[0].duration_weeks, 2);
    assert_eq!(store.subscriptions().len(), 1);
    assert!(store.bookings().is_empty());
}

/// Walks the hybrid planner up to its payment screen with six working days chosen.
async fn hybrid_checkout(session: &Session) -> Vec<NaiveDate> {
    session.dispatch(Action::Search(HomeAction::OpenHybrid)).await;
    session
        .dispatch(Action::Hybrid(HybridAction::SetFrom {
            value: "Berger".to_string(),
        }))
        .await;
    session
        .dispatch(Action::Hybrid(HybridAction::SetTo {
            value: "Lekki Phase 1".to_string(),
        }))
        .await;
    session.dispatch(Action::Hybrid(HybridAction::Search)).await;
    session
        .dispatch(Action::Hybrid(HybridAction::SelectRoute {
            route_id: Uuid::from_u128(1),
        }))
        .await;
    session.dispatch(Action::Hybrid(HybridAction::ConfirmStops)).await;

    let days = upcoming_working_days(6);
    for date in &days {
        session.dispatch(Action::Hybrid(HybridAction::ToggleDate { date: *date })).await;
    }
    session.dispatch(Action::Hybrid(HybridAction::ConfirmDates)).await;
    days
}

#[tokio::test]
async fn test_hybrid_booking_splits_fare_across_dates() {
    let store = seeded_store();
    let session = signed_in(store.clone()).await;
    let days = hybrid_checkout(&session).await;

    let view = session.dispatch(Action::Hybrid(HybridAction::Confirm)).await;
    let ScreenBody::HybridPayment(payment) = view.body else {
        panic!("expected hybrid payment, got {:?}", view.screen);
    };
    assert_eq!(payment.fare.total, 13680);

    let view = session.dispatch(Action::Payment(PaymentAction::Confirm)).await;
    let ScreenBody::HybridTickets(tickets) = view.body else {
        panic!("expected hybrid tickets, got {:?}", view.screen);
    };
    assert_eq!(tickets.total, 6);

    let bookings = store.bookings();
    assert_eq!(bookings.len(), 6);
    assert_eq!(bookings.iter().map(|b| b.total_fare).sum::<i64>(), 13680);
    assert!(bookings.iter().all(|b| b.passenger_name == "Ada Obi"));
    let mut booked: Vec<_> = bookings.iter().map(|b| b.booking_date).collect();
    booked.sort();
    assert_eq!(booked, days);
}

#[tokio::test]
async fn test_failed_hybrid_payment_stores_nothing_and_can_be_retried() {
    let store = seeded_store();
    *store.fail_batch_at.lock().unwrap() = Some(3);
    let session = signed_in(store.clone()).await;
    hybrid_checkout(&session).await;
    session.dispatch(Action::Hybrid(HybridAction::Confirm)).await;

    let view = session.dispatch(Action::Payment(PaymentAction::Confirm)).await;
    let ScreenBody::HybridPayment(payment) = view.body else {
        panic!("expected hybrid payment, got {:?}", view.screen);
    };
    assert!(payment.banner.error.is_some());
    assert!(!payment.processing);
    assert!(store.bookings().is_empty());

    *store.fail_batch_at.lock().unwrap() = None;
    let view = session.dispatch(Action::Payment(PaymentAction::Confirm)).await;
    let ScreenBody::HybridTickets(tickets) = view.body else {
        panic!("expected hybrid tickets, got {:?}", view.screen);
    };
    assert_eq!(tickets.total, 6);
    assert_eq!(store.bookings().len(), 6);
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() {
    let session = Session::new(services(seeded_store()));
    let view = session
        .dispatch(Action::Login(LoginAction::Submit {
            email: support::EMAIL.to_string(),
            password: "wrong".to_string(),
        }))
        .await;

    assert_eq!(view.screen, Screen::Login);
    assert!(!view.signed_in);
    let ScreenBody::Login(login) = view.body else {
        panic!("expected login");
    };
    assert!(login.banner.error.is_some());
    assert!(!login.submitting);
}

#[tokio::test]
async fn test_signed_out_session_cannot_reach_private_screens() {
    let session = signed_in(seeded_store()).await;
    session.dispatch(Action::Open(Screen::Profile)).await;

    let view = session.dispatch(Action::Profile(ProfileAction::SignOut)).await;
    assert_eq!(view.screen, Screen::Login);
    assert!(!view.signed_in);

    let view = session.dispatch(Action::Open(Screen::Home)).await;
    assert_eq!(view.screen, Screen::Login);

    let view = session.dispatch(Action::Open(Screen::Signup)).await;
    assert_eq!(view.screen, Screen::Signup);
}
