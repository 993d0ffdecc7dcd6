//! Route catalogue browsing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::effects::{Effect, Outcome};
use crate::models::{Route, SubscriptionTerms};
use crate::navigation::{Destination, NavIntent, RouteSelection, Screen};
use crate::screens::{Banner, Step};
use crate::utils::dates;

const POPULAR_COUNT: usize = 4;
const TRENDING_END: usize = 7;
pub const MAX_SUBSCRIPTION_WEEKS: u32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Popular,
    Trending,
    All,
}

impl Category {
    /// Popular is the first four routes, trending the next three.
    pub fn select(self, routes: &[Route]) -> &[Route] {
        let n = routes.len();
        match self {
            Category::Popular => &routes[..n.min(POPULAR_COUNT)],
            Category::Trending => &routes[n.min(POPULAR_COUNT)..n.min(TRENDING_END)],
            Category::All => routes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscoverScreen {
    loading: bool,
    routes: Vec<Route>,
    category: Category,
    banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DiscoverAction {
    SetCategory { category: Category },
    ViewRoute { route_id: Uuid },
    Book { route_id: Uuid },
    Subscribe { route_id: Uuid, weeks: u32 },
    ViewSubscriptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverView {
    pub loading: bool,
    pub category: Category,
    pub routes: Vec<Route>,
    pub banner: Banner,
}

impl DiscoverScreen {
    pub fn on_mount(&mut self) -> Step {
        self.loading = true;
        Step::Effect(Effect::LoadRoutes)
    }

    fn find(&self, route_id: Uuid) -> Option<Route> {
        self.routes.iter().find(|r| r.id == route_id).cloned()
    }

    pub fn update(&mut self, action: DiscoverAction, ctx: &mut AppContext) -> Step {
        let travel_date = dates::next_working_day(dates::today());
        match action {
            DiscoverAction::SetCategory { category } => {
                self.category = category;
                Step::None
            }
            DiscoverAction::ViewRoute { route_id } => {
                let Some(route) = self.find(route_id) else {
                    return Step::None;
                };
                ctx.set_search_results(vec![route]);
                Step::navigate(Destination::SearchResults { date: travel_date })
            }
            DiscoverAction::Book { route_id } => match self.find(route_id) {
                Some(route) => Step::Intent(NavIntent::SelectRoute {
                    route,
                    date: Some(travel_date),
                }),
                None => Step::None,
            },
            DiscoverAction::Subscribe { route_id, weeks } => {
                let Some(route) = self.find(route_id) else {
                    return Step::None;
                };
                if !(1..=MAX_SUBSCRIPTION_WEEKS).contains(&weeks) {
                    self.banner.error("Subscriptions run for 1 to 4 weeks");
                    return Step::None;
                }
                let terms = SubscriptionTerms {
                    duration_weeks: weeks,
                    start_date: travel_date,
                    end_date: dates::add_weeks(travel_date, weeks),
                };
                Step::navigate(Destination::PassengerDetails {
                    selection: RouteSelection::Subscription { route, terms },
                })
            }
            DiscoverAction::ViewSubscriptions => Step::navigate(Screen::Profile),
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        self.loading = false;
        match outcome {
            Outcome::Routes(routes) => self.routes = routes,
            Outcome::Failed(message) => self.banner.error(message),
            _ => {}
        }
        Step::None
    }

    pub fn view(&self) -> DiscoverView {
        DiscoverView {
            loading: self.loading,
            category: self.category,
            routes: self.category.select(&self.routes).to_vec(),
            banner: self.banner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_route;
    use crate::navigation::NavIntent;

    fn routes(n: u128) -> Vec<Route> {
        (1..=n)
            .map(|i| Route {
                id: Uuid::from_u128(i),
                ..sample_route()
            })
            .collect()
    }

    fn loaded(n: u128) -> DiscoverScreen {
        let mut screen = DiscoverScreen::default();
        assert!(matches!(screen.on_mount(), Step::Effect(Effect::LoadRoutes)));
        screen.on_outcome(Outcome::Routes(routes(n)));
        screen
    }

    #[test]
    fn test_categories() {
        let all = routes(9);
        assert_eq!(Category::Popular.select(&all).len(), 4);
        let trending = Category::Trending.select(&all);
        assert_eq!(trending.len(), 3);
        assert_eq!(trending[0].id, Uuid::from_u128(5));
        assert_eq!(Category::All.select(&all).len(), 9);

        let few = routes(2);
        assert_eq!(Category::Popular.select(&few).len(), 2);
        assert!(Category::Trending.select(&few).is_empty());
    }

    #[test]
    fn test_view_route_scopes_results() {
        let mut ctx = AppContext::new();
        let mut screen = loaded(5);
        let step = screen.update(
            DiscoverAction::ViewRoute {
                route_id: Uuid::from_u128(3),
            },
            &mut ctx,
        );
        let Step::Intent(NavIntent::NavigateTo(Destination::SearchResults { date })) = step else {
            panic!("expected search results");
        };
        assert!(dates::is_working_day(date));
        assert_eq!(ctx.search_results().len(), 1);
        assert_eq!(ctx.search_results()[0].id, Uuid::from_u128(3));
    }

    #[test]
    fn test_subscribe_sets_terms() {
        let mut ctx = AppContext::new();
        let mut screen = loaded(2);
        let step = screen.update(
            DiscoverAction::Subscribe {
                route_id: Uuid::from_u128(1),
                weeks: 2,
            },
            &mut ctx,
        );
        let Step::Intent(NavIntent::NavigateTo(Destination::PassengerDetails {
            selection: RouteSelection::Subscription { terms, .. },
        })) = step
        else {
            panic!("expected passenger details");
        };
        assert_eq!(terms.duration_weeks, 2);
        assert_eq!(terms.end_date, dates::add_weeks(terms.start_date, 2));

        assert!(matches!(
            screen.update(
                DiscoverAction::Subscribe {
                    route_id: Uuid::from_u128(1),
                    weeks: 5,
                },
                &mut ctx,
            ),
            Step::None
        ));
    }

    #[test]
    fn test_unknown_route_is_ignored() {
        let mut ctx = AppContext::new();
        let mut screen = loaded(2);
        assert!(matches!(
            screen.update(
                DiscoverAction::Book {
                    route_id: Uuid::from_u128(99),
                },
                &mut ctx,
            ),
            Step::None
        ));
    }
}
