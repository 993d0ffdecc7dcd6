//! Issued tickets: a single ticket, the trip history and the tickets of a
//! multi-day booking.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::effects::{Effect, Outcome};
use crate::models::{Ticket, TicketStatus};
use crate::navigation::{Destination, Screen};
use crate::screens::{Banner, Step};
use crate::utils::dates;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BusDetails {
    pub vehicle: &'static str,
    pub colour: &'static str,
    pub license_plate: &'static str,
}

pub const BUS_DETAILS: BusDetails = BusDetails {
    vehicle: "Toyota Hiace",
    colour: "White",
    license_plate: "AKD 111 MB",
};

/// "On Time", "Delayed 30min" or "Cancelled".
pub fn short_status(ticket: &Ticket) -> String {
    match ticket.status {
        TicketStatus::Confirmed => "On Time".to_string(),
        TicketStatus::Delayed => format!("Delayed {}min", ticket.delay_minutes.unwrap_or(0)),
        TicketStatus::Cancelled => "Cancelled".to_string(),
    }
}

/// "Today", "Tomorrow", otherwise "Mon, Dec 23".
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.checked_add_days(Days::new(1)) == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%a, %b %-d").to_string()
    }
}

/// Travel dates from `today` on, then the rest.
fn split_upcoming(tickets: &[Ticket], today: NaiveDate) -> (Vec<Ticket>, Vec<Ticket>) {
    tickets.iter().cloned().partition(|t| t.date >= today)
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketScreen {
    pub ticket: Ticket,
    pub status_text: String,
    pub bus: BusDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TicketAction {
    TrackBus,
    MyTrips,
}

impl TicketScreen {
    pub fn new(ticket: Ticket) -> Self {
        Self {
            status_text: ticket.status_text(),
            ticket,
            bus: BUS_DETAILS,
        }
    }

    pub fn update(&mut self, action: TicketAction) -> Step {
        match action {
            TicketAction::TrackBus => Step::navigate(Destination::TrackBus {
                ticket: self.ticket.clone(),
            }),
            TicketAction::MyTrips => Step::navigate(Screen::Trips),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripsTab {
    #[default]
    Upcoming,
    Past,
}

#[derive(Debug, Clone, Default)]
pub struct TripsScreen {
    loading: bool,
    tickets: Vec<Ticket>,
    tab: TripsTab,
    query: String,
    banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TripsAction {
    SetTab { tab: TripsTab },
    SetQuery { value: String },
    Open { ticket_id: String },
    Refresh,
    BookHybrid,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripItem {
    pub ticket: Ticket,
    pub day: String,
    pub status: String,
    pub hybrid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripsView {
    pub loading: bool,
    pub tab: TripsTab,
    pub query: String,
    pub upcoming_count: usize,
    pub past_count: usize,
    pub trips: Vec<TripItem>,
    pub banner: Banner,
}

impl TripsScreen {
    pub fn on_mount(&mut self) -> Step {
        self.loading = true;
        Step::Effect(Effect::LoadTrips)
    }

    pub fn update(&mut self, action: TripsAction) -> Step {
        match action {
            TripsAction::SetTab { tab } => {
                self.tab = tab;
                Step::None
            }
            TripsAction::SetQuery { value } => {
                self.query = value;
                Step::None
            }
            TripsAction::Open { ticket_id } => match self.tickets.iter().find(|t| t.id == ticket_id) {
                Some(ticket) => Step::navigate(Destination::Ticket { ticket: ticket.clone() }),
                None => Step::None,
            },
            TripsAction::Refresh => {
                if self.loading {
                    Step::None
                } else {
                    self.on_mount()
                }
            }
            TripsAction::BookHybrid => Step::navigate(Screen::HybridBooking),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        self.loading = false;
        match outcome {
            Outcome::Trips(tickets) => {
                self.tickets = tickets;
                self.banner.clear();
            }
            Outcome::Failed(message) => self.banner.error(message),
            _ => {}
        }
        Step::None
    }

    /// Tickets on the current tab whose route or number contains the query.
    fn visible(&self, today: NaiveDate) -> Vec<Ticket> {
        let (upcoming, past) = split_upcoming(&self.tickets, today);
        let query = self.query.trim().to_lowercase();
        let tab = match self.tab {
            TripsTab::Upcoming => upcoming,
            TripsTab::Past => past,
        };
        tab.into_iter()
            .filter(|t| {
                query.is_empty()
                    || t.route.to_lowercase().contains(&query)
                    || t.ticket_number.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn view(&self) -> TripsView {
        let today = dates::today();
        let upcoming_count = self.tickets.iter().filter(|t| t.date >= today).count();
        TripsView {
            loading: self.loading,
            tab: self.tab,
            query: self.query.clone(),
            upcoming_count,
            past_count: self.tickets.len() - upcoming_count,
            trips: self
                .visible(today)
                .into_iter()
                .map(|ticket| TripItem {
                    day: day_label(ticket.date, today),
                    status: short_status(&ticket),
                    hybrid: ticket.is_hybrid(),
                    ticket,
                })
                .collect(),
            banner: self.banner.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HybridTicketsScreen {
    tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HybridTicketsAction {
    Open { ticket_id: String },
    TrackBus { ticket_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct HybridTicketsView {
    pub total: usize,
    pub upcoming: Vec<Ticket>,
    pub past: Vec<Ticket>,
}

impl HybridTicketsScreen {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self { tickets }
    }

    fn find(&self, ticket_id: &str) -> Option<Ticket> {
        self.tickets.iter().find(|t| t.id == ticket_id).cloned()
    }

    pub fn update(&mut self, action: HybridTicketsAction) -> Step {
        match action {
            HybridTicketsAction::Open { ticket_id } => match self.find(&ticket_id) {
                Some(ticket) => Step::navigate(Destination::Ticket { ticket }),
                None => Step::None,
            },
            HybridTicketsAction::TrackBus { ticket_id } => match self.find(&ticket_id) {
                Some(ticket) => Step::navigate(Destination::TrackBus { ticket }),
                None => Step::None,
            },
        }
    }

    pub fn view(&self) -> HybridTicketsView {
        let (upcoming, past) = split_upcoming(&self.tickets, dates::today());
        HybridTicketsView {
            total: self.tickets.len(),
            upcoming,
            past,
        }
    }
}
