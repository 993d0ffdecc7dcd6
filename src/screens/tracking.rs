//! Live bus tracking for one ticket.
//!
//! The screen owns the [`TrackingFeed`]; unmounting the screen drops it and
//! the poller behind it stops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::effects::{Effect, Outcome};
use crate::models::{BusTracking, NotificationKind, Ticket, TrackingStage, TrackingStatus};
use crate::screens::{Banner, Step};
use crate::services::TrackingFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Completed,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageProgress {
    pub stage: TrackingStage,
    pub label: &'static str,
    pub description: &'static str,
    pub state: StageState,
}

const STAGES: [(TrackingStage, &str, &str); 4] = [
    (TrackingStage::Departed, "Departed from terminal", "Bus has left the depot"),
    (TrackingStage::Approaching, "Approaching your stop", "Getting closer to you"),
    (TrackingStage::ArrivingShortly, "Arriving shortly", "Almost at your location"),
    (TrackingStage::Completed, "Trip completed", "Journey finished"),
];

pub fn stage_progress(current: TrackingStage) -> Vec<StageProgress> {
    STAGES
        .iter()
        .map(|&(stage, label, description)| StageProgress {
            stage,
            label,
            description,
            state: match stage.cmp(&current) {
                std::cmp::Ordering::Less => StageState::Completed,
                std::cmp::Ordering::Equal => StageState::Active,
                std::cmp::Ordering::Greater => StageState::Upcoming,
            },
        })
        .collect()
}

pub fn status_text(status: TrackingStatus) -> &'static str {
    match status {
        TrackingStatus::Idle => "Idle",
        TrackingStatus::EnRoute => "En Route",
        TrackingStatus::Delayed => "Delayed",
        TrackingStatus::Arrived => "Arrived",
    }
}

pub fn last_updated_label(updated: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (now - updated).num_minutes() {
        m if m < 1 => "Just now".to_string(),
        1 => "1 minute ago".to_string(),
        m => format!("{} minutes ago", m),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Preferences {
    notify_10min: bool,
    notify_delay: bool,
}

impl Preferences {
    fn get(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::TenMinutes => self.notify_10min,
            NotificationKind::Delay => self.notify_delay,
        }
    }

    fn set(&mut self, kind: NotificationKind, enabled: bool) {
        match kind {
            NotificationKind::TenMinutes => self.notify_10min = enabled,
            NotificationKind::Delay => self.notify_delay = enabled,
        }
    }
}

impl From<&BusTracking> for Preferences {
    fn from(tracking: &BusTracking) -> Self {
        Self {
            notify_10min: tracking.notify_10min,
            notify_delay: tracking.notify_delay,
        }
    }
}

#[derive(Debug)]
pub struct TrackBusScreen {
    ticket: Ticket,
    loading: bool,
    feed: Option<TrackingFeed>,
    /// Shown until the feed delivers the stored row.
    placeholder: BusTracking,
    preferences: Preferences,
    /// Stored preferences as last seen from the feed. A feed value that
    /// differs was written elsewhere and replaces the local copy.
    seen: Preferences,
    /// Toggle sent to the store and not yet confirmed, with the value to
    /// restore if it fails.
    pending: Option<(NotificationKind, bool)>,
    banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrackingAction {
    ToggleNotification { kind: NotificationKind },
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingView {
    pub ticket: Ticket,
    pub loading: bool,
    pub live: bool,
    pub tracking: BusTracking,
    pub status_text: &'static str,
    pub stages: Vec<StageProgress>,
    pub last_updated: String,
    pub banner: Banner,
}

impl TrackBusScreen {
    pub fn new(ticket: Ticket) -> Self {
        let placeholder = BusTracking::placeholder(Utc::now());
        Self {
            ticket,
            loading: false,
            feed: None,
            preferences: Preferences::from(&placeholder),
            seen: Preferences::from(&placeholder),
            placeholder,
            pending: None,
            banner: Banner::default(),
        }
    }

    pub fn on_mount(&mut self) -> Step {
        match Uuid::parse_str(&self.ticket.id) {
            Ok(booking_id) => {
                self.loading = true;
                Step::Effect(Effect::OpenTracking(booking_id))
            }
            Err(_) => {
                tracing::debug!(ticket = %self.ticket.ticket_number, "Ticket has no stored booking to track");
                Step::None
            }
        }
    }

    fn snapshot(&self) -> BusTracking {
        self.feed
            .as_ref()
            .map(TrackingFeed::latest)
            .unwrap_or_else(|| self.placeholder.clone())
    }

    fn current_preferences(&self) -> Preferences {
        match &self.feed {
            Some(feed) if self.pending.is_none() => {
                let stored = Preferences::from(&feed.latest());
                if stored != self.seen { stored } else { self.preferences }
            }
            _ => self.preferences,
        }
    }

    fn sync_preferences(&mut self) {
        self.preferences = self.current_preferences();
        if let Some(feed) = &self.feed {
            self.seen = Preferences::from(&feed.latest());
        }
    }

    pub fn update(&mut self, action: TrackingAction) -> Step {
        match action {
            TrackingAction::ToggleNotification { kind } => {
                if self.pending.is_some() {
                    return Step::None;
                }
                self.sync_preferences();
                let previous = self.preferences.get(kind);
                self.preferences.set(kind, !previous);

                let Some(tracking_id) = self.snapshot().id else {
                    return Step::None;
                };
                self.pending = Some((kind, previous));
                Step::Effect(Effect::SetNotification {
                    tracking_id,
                    kind,
                    enabled: !previous,
                })
            }
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        match outcome {
            Outcome::Tracking(feed) => {
                self.loading = false;
                self.preferences = Preferences::from(&feed.latest());
                self.seen = self.preferences;
                self.feed = Some(feed);
            }
            Outcome::NotificationSet { kind, enabled } => {
                self.pending = None;
                self.preferences.set(kind, enabled);
            }
            Outcome::Failed(message) => {
                self.loading = false;
                if let Some((kind, previous)) = self.pending.take() {
                    self.preferences.set(kind, previous);
                }
                self.banner.error(message);
            }
            _ => {}
        }
        Step::None
    }

    pub fn view(&self) -> TrackingView {
        let mut tracking = self.snapshot();
        let preferences = self.current_preferences();
        tracking.notify_10min = preferences.notify_10min;
        tracking.notify_delay = preferences.notify_delay;
        TrackingView {
            ticket: self.ticket.clone(),
            loading: self.loading,
            live: self.feed.as_ref().is_some_and(TrackingFeed::is_live),
            status_text: status_text(tracking.status),
            stages: stage_progress(tracking.current_stage),
            last_updated: last_updated_label(tracking.last_updated, Utc::now()),
            tracking,
            banner: self.banner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketStatus;
    use chrono::{Duration, NaiveDate};

    fn ticket(id: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            ticket_number: "MB12345678".to_string(),
            passenger_name: "Ada Obi".to_string(),
            route: "Berger → Lekki Phase 1".to_string(),
            boarding_time: "05:40".to_string(),
            boarding_point: "Ogudu".to_string(),
            deboarding_point: "Bonny Camp".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 23).unwrap(),
            status: TicketStatus::Confirmed,
            delay_minutes: None,
            barcode: "MB1734943200000".to_string(),
        }
    }

    #[test]
    fn test_stage_progress() {
        let states: Vec<_> = stage_progress(TrackingStage::Approaching)
            .into_iter()
            .map(|s| s.state)
            .collect();
        assert_eq!(
            states,
            [StageState::Completed, StageState::Active, StageState::Upcoming, StageState::Upcoming]
        );
    }

    #[test]
    fn test_last_updated_label() {
        let now = Utc::now();
        assert_eq!(last_updated_label(now - Duration::seconds(30), now), "Just now");
        assert_eq!(last_updated_label(now - Duration::seconds(90), now), "1 minute ago");
        assert_eq!(last_updated_label(now - Duration::minutes(7), now), "7 minutes ago");
    }

    #[test]
    fn test_mount_opens_feed_for_stored_booking() {
        let id = Uuid::from_u128(77);
        let mut screen = TrackBusScreen::new(ticket(&id.to_string()));
        assert!(matches!(screen.on_mount(), Step::Effect(Effect::OpenTracking(b)) if b == id));

        let mut local = TrackBusScreen::new(ticket("1734943200000"));
        assert!(matches!(local.on_mount(), Step::None));
        let view = local.view();
        assert_eq!(view.tracking.bus_number, "Bus 07");
        assert_eq!(view.status_text, "En Route");
        assert!(!view.live);
    }

    #[test]
    fn test_placeholder_toggle_stays_local() {
        let mut screen = TrackBusScreen::new(ticket("local"));
        let step = screen.update(TrackingAction::ToggleNotification {
            kind: NotificationKind::Delay,
        });
        assert!(matches!(step, Step::None));
        assert!(!screen.view().tracking.notify_delay);
    }
}
