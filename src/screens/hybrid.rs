//! Multi-day booking wizard for riders who only commute on some days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::effects::{Effect, Outcome};
use crate::models::{HybridBooking, Route};
use crate::navigation::{Completion, NavIntent};
use crate::screens::{Banner, Step};
use crate::utils::dates;
use crate::utils::pricing::{self, FareBreakdown, HYBRID_BULK_THRESHOLD};

/// Most dates a rider can pick in one go.
pub const MAX_SELECTED_DATES: usize = 10;

/// Working days picked on a calendar, kept ascending without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatePicker {
    selected: Vec<NaiveDate>,
    #[serde(skip)]
    limit: Option<usize>,
}

impl DatePicker {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            selected: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Dates on or before `today` and weekend dates can't be picked.
    pub fn is_selectable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        if date <= today || !dates::is_working_day(date) {
            return false;
        }
        self.selected.contains(&date) || self.limit.is_none_or(|max| self.selected.len() < max)
    }

    /// Select or deselect `date`. Returns false when the date can't be picked.
    pub fn toggle(&mut self, date: NaiveDate, today: NaiveDate) -> bool {
        if !self.is_selectable(date, today) {
            return false;
        }
        match self.selected.binary_search(&date) {
            Ok(index) => {
                self.selected.remove(index);
            }
            Err(index) => self.selected.insert(index, date),
        }
        true
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Route,
    Stops,
    Dates,
    Summary,
}

#[derive(Debug, Clone)]
pub struct HybridBookingScreen {
    step: WizardStep,
    from: String,
    to: String,
    searching: bool,
    /// `None` until a search has come back.
    routes: Option<Vec<Route>>,
    route: Option<Route>,
    boarding_point: String,
    deboarding_point: String,
    dates: DatePicker,
    banner: Banner,
}

impl Default for HybridBookingScreen {
    fn default() -> Self {
        Self {
            step: WizardStep::Route,
            from: String::new(),
            to: String::new(),
            searching: false,
            routes: None,
            route: None,
            boarding_point: String::new(),
            deboarding_point: String::new(),
            dates: DatePicker::with_limit(MAX_SELECTED_DATES),
            banner: Banner::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HybridAction {
    SetFrom { value: String },
    SetTo { value: String },
    Search,
    SelectRoute { route_id: Uuid },
    SetStops { boarding_point: String, deboarding_point: String },
    ConfirmStops,
    ToggleDate { date: NaiveDate },
    ConfirmDates,
    /// Return to an earlier step of the wizard.
    Edit { step: WizardStep },
    Confirm,
}

#[derive(Debug, Clone, Serialize)]
pub struct HybridBookingView {
    pub step: WizardStep,
    pub from: String,
    pub to: String,
    pub searching: bool,
    pub search_performed: bool,
    pub routes: Vec<Route>,
    pub route: Option<Route>,
    pub stop_suggestions: Vec<String>,
    pub boarding_point: String,
    pub deboarding_point: String,
    pub dates: Vec<NaiveDate>,
    pub max_dates: usize,
    pub fare: Option<FareBreakdown>,
    pub discount_note: Option<&'static str>,
    pub banner: Banner,
}

impl HybridBookingScreen {
    fn fare(&self) -> Option<FareBreakdown> {
        let route = self.route.as_ref()?;
        (!self.dates.is_empty()).then(|| pricing::hybrid_fare(route.price, self.dates.len()))
    }

    pub fn update(&mut self, action: HybridAction) -> Step {
        match action {
            HybridAction::SetFrom { value } => {
                self.from = value;
                self.routes = None;
                Step::None
            }
            HybridAction::SetTo { value } => {
                self.to = value;
                self.routes = None;
                Step::None
            }
            HybridAction::Search => {
                let (from, to) = (self.from.trim().to_string(), self.to.trim().to_string());
                if self.searching || from.is_empty() || to.is_empty() {
                    return Step::None;
                }
                self.searching = true;
                self.banner.clear();
                Step::Effect(Effect::FindRoutes { from, to })
            }
            HybridAction::SelectRoute { route_id } => {
                let Some(route) = self.routes.iter().flatten().find(|r| r.id == route_id).cloned() else {
                    return Step::None;
                };
                self.boarding_point = route.from.clone();
                self.deboarding_point = route.to.clone();
                self.route = Some(route);
                self.step = WizardStep::Stops;
                Step::None
            }
            HybridAction::SetStops {
                boarding_point,
                deboarding_point,
            } => {
                self.boarding_point = boarding_point;
                self.deboarding_point = deboarding_point;
                Step::None
            }
            HybridAction::ConfirmStops => {
                if self.route.is_some()
                    && !self.boarding_point.trim().is_empty()
                    && !self.deboarding_point.trim().is_empty()
                {
                    self.step = WizardStep::Dates;
                }
                Step::None
            }
            HybridAction::ToggleDate { date } => {
                if !self.dates.toggle(date, dates::today()) {
                    tracing::debug!(%date, "Date not selectable");
                }
                Step::None
            }
            HybridAction::ConfirmDates => {
                if self.route.is_some() && !self.dates.is_empty() {
                    self.step = WizardStep::Summary;
                }
                Step::None
            }
            HybridAction::Edit { step } => {
                if step < self.step {
                    self.step = step;
                }
                Step::None
            }
            HybridAction::Confirm => {
                let (Some(route), Some(fare)) = (self.route.clone(), self.fare()) else {
                    return Step::None;
                };
                if self.step != WizardStep::Summary {
                    return Step::None;
                }
                Step::Intent(NavIntent::Complete(Completion::HybridBooking(HybridBooking {
                    route,
                    boarding_point: self.boarding_point.trim().to_string(),
                    deboarding_point: self.deboarding_point.trim().to_string(),
                    dates: self.dates.dates().to_vec(),
                    fare,
                })))
            }
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        self.searching = false;
        match outcome {
            Outcome::Routes(routes) => {
                self.routes = Some(routes);
                Step::None
            }
            Outcome::Failed(message) => {
                self.banner.error(message);
                Step::None
            }
            _ => Step::None,
        }
    }

    pub fn view(&self) -> HybridBookingView {
        HybridBookingView {
            step: self.step,
            from: self.from.clone(),
            to: self.to.clone(),
            searching: self.searching,
            search_performed: self.routes.is_some(),
            routes: self.routes.clone().unwrap_or_default(),
            route: self.route.clone(),
            stop_suggestions: self.route.as_ref().map(Route::stop_list).unwrap_or_default(),
            boarding_point: self.boarding_point.clone(),
            deboarding_point: self.deboarding_point.clone(),
            dates: self.dates.dates().to_vec(),
            max_dates: MAX_SELECTED_DATES,
            fare: self.fare(),
            discount_note: (self.dates.len() >= HYBRID_BULK_THRESHOLD).then_some("5% bulk discount applied!"),
            banner: self.banner.clone(),
        }
    }
}
