//! Home: route search for a working day, quick routes and the entry to the
//! multi-day booking wizard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::effects::{Effect, Outcome};
use crate::models::Route;
use crate::navigation::{Destination, Screen};
use crate::screens::{Banner, Step};
use crate::utils::dates::{self, NOT_A_WORKING_DAY};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuickRoute {
    pub from: &'static str,
    pub to: &'static str,
}

impl QuickRoute {
    const fn new(from: &'static str, to: &'static str) -> Self {
        Self { from, to }
    }
}

pub const QUICK_ROUTES: [QuickRoute; 3] = [
    QuickRoute::new("Berger", "Lekki Phase 1"),
    QuickRoute::new("Ikorodu", "Lekki Phase 1"),
    QuickRoute::new("TBS", "Ikorodu"),
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LocationSuggestion {
    pub value: &'static str,
    pub label: &'static str,
}

const fn suggestion(value: &'static str, label: &'static str) -> LocationSuggestion {
    LocationSuggestion { value, label }
}

pub const LOCATION_SUGGESTIONS: [LocationSuggestion; 15] = [
    suggestion("Berger", "Berger Bus Stop"),
    suggestion("Ikorodu", "Ikorodu Terminal"),
    suggestion("TBS", "Tafawa Balewa Square"),
    suggestion("Lekki Phase 1", "Lekki Phase 1 Terminal"),
    suggestion("Victoria Island", "Victoria Island"),
    suggestion("Ikeja", "Ikeja Bus Terminal"),
    suggestion("Surulere", "Surulere"),
    suggestion("Ojota", "Ojota Terminal"),
    suggestion("Mile 2", "Mile 2 Bus Stop"),
    suggestion("Oshodi", "Oshodi Interchange"),
    suggestion("Yaba", "Yaba Bus Stop"),
    suggestion("Marina", "Marina Terminal"),
    suggestion("CMS", "CMS Bus Stop"),
    suggestion("Obalende", "Obalende Terminal"),
    suggestion("Ketu", "Ketu Bus Stop"),
];

#[derive(Debug, Clone)]
pub struct HomeScreen {
    from: String,
    to: String,
    date: String,
    date_error: Option<String>,
    /// Date the listed buses were searched for.
    searched: Option<NaiveDate>,
    available: Vec<Route>,
    searching: bool,
    banner: Banner,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub greeting: String,
    pub wallet_balance: i64,
    pub working_day_message: &'static str,
    pub from: String,
    pub to: String,
    pub date: String,
    pub date_error: Option<String>,
    pub can_search: bool,
    pub searching: bool,
    pub search_performed: bool,
    pub available: Vec<Route>,
    pub quick_routes: &'static [QuickRoute],
    pub suggestions: &'static [LocationSuggestion],
    pub banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HomeAction {
    SetFrom { value: String },
    SetTo { value: String },
    SetDate { value: String },
    Search,
    QuickRoute { from: String, to: String },
    ViewAll,
    ViewBus { route_id: Uuid },
    OpenHybrid,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            date: dates::format_date_for_input(dates::next_working_day(dates::today())),
            date_error: None,
            searched: None,
            available: Vec::new(),
            searching: false,
            banner: Banner::default(),
        }
    }

    fn reset_results(&mut self) {
        self.searched = None;
        self.available.clear();
    }

    /// The picked date, or the inline message explaining why it can't be used.
    fn checked_date(&self) -> Result<NaiveDate, String> {
        let date = dates::date_from_string(&self.date).map_err(|_| "Please choose a valid date".to_string())?;
        if dates::is_working_day(date) {
            Ok(date)
        } else {
            Err(NOT_A_WORKING_DAY.to_string())
        }
    }

    fn can_search(&self) -> bool {
        !self.from.trim().is_empty()
            && !self.to.trim().is_empty()
            && !self.date.is_empty()
            && self.date_error.is_none()
    }

    pub fn update(&mut self, action: HomeAction, ctx: &mut AppContext) -> Step {
        match action {
            HomeAction::SetFrom { value } => {
                self.from = value;
                self.reset_results();
                Step::None
            }
            HomeAction::SetTo { value } => {
                self.to = value;
                self.reset_results();
                Step::None
            }
            HomeAction::SetDate { value } => {
                self.date = value;
                self.date_error = if self.date.is_empty() {
                    None
                } else {
                    self.checked_date().err()
                };
                Step::None
            }
            HomeAction::Search => {
                if self.searching || !self.can_search() {
                    return Step::None;
                }
                match self.checked_date() {
                    Ok(date) => self.search(self.from.trim().to_string(), self.to.trim().to_string(), date),
                    Err(message) => {
                        self.date_error = Some(message);
                        Step::None
                    }
                }
            }
            HomeAction::QuickRoute { from, to } => {
                let date = dates::next_working_day(dates::today());
                self.from = from.clone();
                self.to = to.clone();
                self.date = dates::format_date_for_input(date);
                self.date_error = None;
                self.search(from, to, date)
            }
            HomeAction::ViewAll => match self.searched {
                Some(date) => Step::navigate(Destination::SearchResults { date }),
                None => Step::None,
            },
            HomeAction::ViewBus { route_id } => {
                let (Some(date), Some(bus)) = (self.searched, self.available.iter().find(|r| r.id == route_id))
                else {
                    return Step::None;
                };
                ctx.set_search_results(vec![bus.clone()]);
                Step::navigate(Destination::SearchResults { date })
            }
            HomeAction::OpenHybrid => Step::navigate(Screen::HybridBooking),
        }
    }

    fn search(&mut self, from: String, to: String, date: NaiveDate) -> Step {
        self.searching = true;
        self.banner.clear();
        self.reset_results();
        Step::Effect(Effect::SearchRoutes { from, to, date })
    }

    pub fn on_outcome(&mut self, outcome: Outcome, ctx: &mut AppContext) -> Step {
        self.searching = false;
        match outcome {
            Outcome::SearchResults { routes, date } => {
                ctx.set_search_results(routes.clone());
                self.available = routes;
                self.searched = Some(date);
                Step::None
            }
            Outcome::Failed(message) => {
                self.banner.error(message);
                Step::None
            }
            _ => Step::None,
        }
    }

    pub fn view(&self, ctx: &AppContext) -> HomeView {
        let name = ctx.profile().full_name.split_whitespace().next().unwrap_or("there");
        HomeView {
            greeting: format!("Hello, {}", name),
            wallet_balance: ctx.profile().wallet_balance,
            working_day_message: dates::working_day_message(dates::today()),
            from: self.from.clone(),
            to: self.to.clone(),
            date: self.date.clone(),
            date_error: self.date_error.clone(),
            can_search: self.can_search() && !self.searching,
            searching: self.searching,
            search_performed: self.searched.is_some(),
            available: self.available.clone(),
            quick_routes: &QUICK_ROUTES,
            suggestions: &LOCATION_SUGGESTIONS,
            banner: self.banner.clone(),
        }
    }
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_route;
    use crate::navigation::NavIntent;

    // 2024-12-21 is a Saturday
    const SATURDAY: &str = "2024-12-21";
    const MONDAY: &str = "2024-12-23";

    fn filled(date: &str) -> HomeScreen {
        let mut screen = HomeScreen::new();
        let mut ctx = AppContext::new();
        screen.update(HomeAction::SetFrom { value: "Berger".to_string() }, &mut ctx);
        screen.update(HomeAction::SetTo { value: "Lekki Phase 1".to_string() }, &mut ctx);
        screen.update(HomeAction::SetDate { value: date.to_string() }, &mut ctx);
        screen
    }

    #[test]
    fn test_default_date_is_a_working_day() {
        let screen = HomeScreen::new();
        let date = dates::date_from_string(&screen.date).unwrap();
        assert!(dates::is_working_day(date));
        assert!(date > dates::today());
    }

    #[test]
    fn test_weekend_date_blocks_search() {
        let mut ctx = AppContext::new();
        let mut screen = filled(SATURDAY);
        assert_eq!(screen.date_error.as_deref(), Some(NOT_A_WORKING_DAY));
        assert!(matches!(screen.update(HomeAction::Search, &mut ctx), Step::None));
    }

    #[test]
    fn test_search_lists_buses_inline() {
        let mut ctx = AppContext::new();
        let mut screen = filled(MONDAY);
        let step = screen.update(HomeAction::Search, &mut ctx);
        let Step::Effect(Effect::SearchRoutes { from, to, date }) = step else {
            panic!("expected a search");
        };
        assert_eq!((from.as_str(), to.as_str()), ("Berger", "Lekki Phase 1"));

        let mut other = sample_route();
        other.id = Uuid::from_u128(2);
        screen.on_outcome(
            Outcome::SearchResults {
                routes: vec![sample_route(), other.clone()],
                date,
            },
            &mut ctx,
        );
        assert_eq!(ctx.search_results().len(), 2);
        assert!(screen.view(&ctx).search_performed);

        let step = screen.update(HomeAction::ViewBus { route_id: other.id }, &mut ctx);
        assert!(matches!(
            step,
            Step::Intent(NavIntent::NavigateTo(Destination::SearchResults { date: d })) if d == date
        ));
        assert_eq!(ctx.search_results(), &[other]);
    }

    #[test]
    fn test_quick_route_searches_next_working_day() {
        let mut ctx = AppContext::new();
        let mut screen = HomeScreen::new();
        let step = screen.update(
            HomeAction::QuickRoute {
                from: "TBS".to_string(),
                to: "Ikorodu".to_string(),
            },
            &mut ctx,
        );
        let Step::Effect(Effect::SearchRoutes { date, .. }) = step else {
            panic!("expected a search");
        };
        assert_eq!(date, dates::next_working_day(dates::today()));
        assert_eq!(screen.from, "TBS");
    }

    #[test]
    fn test_editing_origin_discards_results() {
        let mut ctx = AppContext::new();
        let mut screen = filled(MONDAY);
        screen.on_outcome(
            Outcome::SearchResults {
                routes: vec![sample_route()],
                date: dates::date_from_string(MONDAY).unwrap(),
            },
            &mut ctx,
        );
        screen.update(HomeAction::SetFrom { value: "TBS".to_string() }, &mut ctx);
        assert!(screen.available.is_empty());
        assert!(matches!(screen.update(HomeAction::ViewAll, &mut ctx), Step::None));
    }
}
