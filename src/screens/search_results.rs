use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::models::Route;
use crate::navigation::{NavIntent, Slots};
use crate::screens::Step;
use crate::utils::dates;

/// Routes found by the last search, as stored on the session.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultsScreen {
    pub date: NaiveDate,
    pub routes: Vec<Route>,
    pub expanded: Option<Uuid>,
    pub showing_stops: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResultsAction {
    ToggleExpand { route_id: Uuid },
    ToggleStops { route_id: Uuid },
    Select { route_id: Uuid },
}

fn toggle(slot: &mut Option<Uuid>, id: Uuid) {
    *slot = if *slot == Some(id) { None } else { Some(id) };
}

impl SearchResultsScreen {
    pub fn new(slots: &Slots, ctx: &AppContext) -> Self {
        Self {
            date: slots.date.unwrap_or_else(dates::today),
            routes: ctx.search_results().to_vec(),
            expanded: None,
            showing_stops: None,
        }
    }

    pub fn update(&mut self, action: ResultsAction) -> Step {
        match action {
            ResultsAction::ToggleExpand { route_id } => {
                toggle(&mut self.expanded, route_id);
                Step::None
            }
            ResultsAction::ToggleStops { route_id } => {
                toggle(&mut self.showing_stops, route_id);
                Step::None
            }
            ResultsAction::Select { route_id } => match self.routes.iter().find(|r| r.id == route_id) {
                Some(route) => Step::Intent(NavIntent::SelectRoute {
                    route: route.clone(),
                    date: Some(self.date),
                }),
                None => {
                    tracing::debug!(%route_id, "Selected route is not in the results");
                    Step::None
                }
            },
        }
    }
}
