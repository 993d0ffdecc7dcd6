//! Account screen: profile details, wallet, subscriptions and their
//! planner, quick booking of a preferred route, support and sign-out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::effects::{Effect, Outcome};
use crate::models::{PaymentMethod, ProfileUpdate, Route, RouteSubscription, SubscriptionPlan, SubscriptionQuote};
use crate::navigation::{Completion, Destination, NavIntent};
use crate::screens::hybrid::DatePicker;
use crate::screens::{Banner, Step};
use crate::utils::dates::{self, NOT_A_WORKING_DAY};
use crate::utils::pricing::{self, FareBreakdown};

pub const MIN_WALLET_FUNDING: i64 = 100;
pub const MAX_SUPPORT_MESSAGE_LEN: usize = 500;
pub const MAX_PLAN_WEEKS: u32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    #[default]
    Weekly,
    Custom,
}

#[derive(Debug, Clone)]
struct Planner {
    route_id: Option<Uuid>,
    kind: PlanKind,
    weeks: u32,
    dates: DatePicker,
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            route_id: None,
            kind: PlanKind::Weekly,
            weeks: 1,
            dates: DatePicker::default(),
        }
    }
}

impl Planner {
    fn plan(&self) -> SubscriptionPlan {
        match self.kind {
            PlanKind::Weekly => SubscriptionPlan::Weekly { weeks: self.weeks },
            PlanKind::Custom => SubscriptionPlan::Custom {
                dates: self.dates.dates().to_vec(),
            },
        }
    }

    fn fare(&self) -> Option<FareBreakdown> {
        match self.kind {
            PlanKind::Weekly => Some(pricing::planner_weekly_fare(self.weeks)),
            PlanKind::Custom if self.dates.is_empty() => None,
            PlanKind::Custom => Some(pricing::custom_subscription_fare(self.dates.len())),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct QuickBooking {
    route: Option<String>,
    date: String,
    date_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileScreen {
    loading: bool,
    editing: bool,
    draft: ProfileUpdate,
    saving: bool,
    routes: Vec<Route>,
    show_funding: bool,
    funding_amount: String,
    funding_method: PaymentMethod,
    support_expanded: bool,
    support_subject: String,
    support_message: String,
    sending_support: bool,
    planner: Planner,
    quick: QuickBooking,
    /// Date of the quick booking search in flight.
    quick_search: Option<NaiveDate>,
    banner: Banner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ProfileAction {
    Edit,
    ChangeDraft(ProfileUpdate),
    Save,
    CancelEdit,
    ShowFunding { show: bool },
    SetFundingAmount { value: String },
    SetFundingMethod { method: PaymentMethod },
    FundWallet,
    ToggleSupport,
    SetSupport { subject: String, message: String },
    SendSupport,
    Unsubscribe { subscription_id: Uuid },
    PlanRoute { route_id: Uuid },
    PlanType { kind: PlanKind },
    PlanWeeks { weeks: u32 },
    PlanToggleDate { date: NaiveDate },
    Subscribe,
    QuickRoute { route: String },
    QuickDate { value: String },
    QuickBook,
    SignOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletView {
    pub balance: i64,
    pub show_funding: bool,
    pub amount: String,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportView {
    pub expanded: bool,
    pub subject: String,
    pub message: String,
    pub remaining: usize,
    pub sending: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannerView {
    pub routes: Vec<Route>,
    pub route_id: Option<Uuid>,
    pub kind: PlanKind,
    pub weeks: u32,
    pub dates: Vec<NaiveDate>,
    pub description: String,
    pub fare: Option<FareBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickBookingView {
    pub routes: Vec<String>,
    pub route: Option<String>,
    pub date: String,
    pub date_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub loading: bool,
    pub editing: bool,
    pub saving: bool,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub emergency_contact: String,
    pub draft: Option<ProfileUpdate>,
    pub subscriptions: Vec<RouteSubscription>,
    pub wallet: WalletView,
    pub support: SupportView,
    pub planner: PlannerView,
    pub quick_booking: QuickBookingView,
    pub banner: Banner,
}

impl ProfileScreen {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            loading: false,
            editing: false,
            draft: ProfileUpdate::from(ctx.profile()),
            saving: false,
            routes: Vec::new(),
            show_funding: false,
            funding_amount: String::new(),
            funding_method: PaymentMethod::Card,
            support_expanded: false,
            support_subject: String::new(),
            support_message: String::new(),
            sending_support: false,
            planner: Planner::default(),
            quick: QuickBooking {
                date: dates::format_date_for_input(dates::next_working_day(dates::today())),
                ..Default::default()
            },
            quick_search: None,
            banner: Banner::default(),
        }
    }

    pub fn on_mount(&mut self, _ctx: &AppContext) -> Step {
        self.loading = true;
        Step::Effect(Effect::LoadAccount)
    }

    pub fn update(&mut self, action: ProfileAction, ctx: &mut AppContext) -> Step {
        match action {
            ProfileAction::Edit => {
                self.draft = ProfileUpdate::from(ctx.profile());
                self.editing = true;
                Step::None
            }
            ProfileAction::ChangeDraft(draft) => {
                if self.editing {
                    self.draft = draft;
                }
                Step::None
            }
            ProfileAction::Save => {
                if !self.editing || self.saving {
                    return Step::None;
                }
                if self.draft.full_name.trim().is_empty() || self.draft.email.trim().is_empty() {
                    self.banner.error("Name and email are required");
                    return Step::None;
                }
                self.saving = true;
                Step::Effect(Effect::SaveProfile(self.draft.clone()))
            }
            ProfileAction::CancelEdit => {
                self.editing = false;
                self.draft = ProfileUpdate::from(ctx.profile());
                Step::None
            }
            ProfileAction::ShowFunding { show } => {
                self.show_funding = show;
                if !show {
                    self.funding_amount.clear();
                }
                Step::None
            }
            ProfileAction::SetFundingAmount { value } => {
                self.funding_amount = value;
                Step::None
            }
            ProfileAction::SetFundingMethod { method } => {
                self.funding_method = method;
                Step::None
            }
            ProfileAction::FundWallet => match self.funding_amount.trim().parse::<i64>() {
                Ok(amount) if amount >= MIN_WALLET_FUNDING => {
                    tracing::debug!(amount, method = ?self.funding_method, "Funding wallet");
                    Step::Effect(Effect::FundWallet(amount))
                }
                _ => {
                    self.banner.error("Minimum funding amount is ₦100");
                    Step::None
                }
            },
            ProfileAction::ToggleSupport => {
                self.support_expanded = !self.support_expanded;
                Step::None
            }
            ProfileAction::SetSupport { subject, message } => {
                self.support_subject = subject;
                self.support_message = message;
                Step::None
            }
            ProfileAction::SendSupport => {
                if self.sending_support {
                    return Step::None;
                }
                let (subject, message) = (self.support_subject.trim(), self.support_message.trim());
                if subject.is_empty() || message.is_empty() {
                    self.banner.error("Please fill in both subject and message");
                    return Step::None;
                }
                if self.support_message.chars().count() > MAX_SUPPORT_MESSAGE_LEN {
                    self.banner.error("Message must be 500 characters or less");
                    return Step::None;
                }
                let effect = Effect::SendSupport {
                    subject: subject.to_string(),
                    message: message.to_string(),
                };
                self.sending_support = true;
                Step::Effect(effect)
            }
            ProfileAction::Unsubscribe { subscription_id } => {
                if ctx.profile().subscriptions.iter().any(|s| s.id == subscription_id) {
                    Step::Effect(Effect::Unsubscribe(subscription_id))
                } else {
                    Step::None
                }
            }
            ProfileAction::PlanRoute { route_id } => {
                if self.routes.iter().any(|r| r.id == route_id) {
                    self.planner.route_id = Some(route_id);
                }
                Step::None
            }
            ProfileAction::PlanType { kind } => {
                self.planner.kind = kind;
                if kind == PlanKind::Weekly {
                    self.planner.dates.clear();
                }
                Step::None
            }
            ProfileAction::PlanWeeks { weeks } => {
                self.planner.weeks = weeks.clamp(1, MAX_PLAN_WEEKS);
                Step::None
            }
            ProfileAction::PlanToggleDate { date } => {
                self.planner.dates.toggle(date, dates::today());
                Step::None
            }
            ProfileAction::Subscribe => self.subscribe(),
            ProfileAction::QuickRoute { route } => {
                if ctx.profile().preferred_routes.contains(&route) {
                    self.quick.route = Some(route);
                    self.quick.date_error = None;
                }
                Step::None
            }
            ProfileAction::QuickDate { value } => {
                self.quick.date_error = match dates::date_from_string(&value) {
                    Ok(date) if !dates::is_working_day(date) => Some(NOT_A_WORKING_DAY.to_string()),
                    _ => None,
                };
                self.quick.date = value;
                Step::None
            }
            ProfileAction::QuickBook => self.quick_book(),
            ProfileAction::SignOut => Step::Effect(Effect::SignOut),
        }
    }

    fn subscribe(&mut self) -> Step {
        let Some(route) = self
            .planner
            .route_id
            .and_then(|id| self.routes.iter().find(|r| r.id == id))
            .cloned()
        else {
            self.banner.error("Please choose a route to subscribe to");
            return Step::None;
        };
        let Some(fare) = self.planner.fare() else {
            self.banner.error("Please select at least one date for your custom subscription");
            return Step::None;
        };

        let quote = SubscriptionQuote {
            route,
            plan: self.planner.plan(),
            fare,
        };
        tracing::debug!(plan = %quote.plan.description(), total = fare.total, "Subscription quoted");
        self.planner = Planner::default();
        Step::navigate(Destination::SubscriptionPayment { quote })
    }

    fn quick_book(&mut self) -> Step {
        if self.quick_search.is_some() || self.quick.date_error.is_some() {
            return Step::None;
        }
        let Some((from, to)) = self.quick.route.as_deref().and_then(|r| r.split_once(" - ")) else {
            return Step::None;
        };
        let date = match dates::date_from_string(&self.quick.date) {
            Ok(date) if dates::is_working_day(date) => date,
            Ok(_) => {
                self.quick.date_error = Some(NOT_A_WORKING_DAY.to_string());
                return Step::None;
            }
            Err(_) => return Step::None,
        };
        let effect = Effect::SearchRoutes {
            from: from.trim().to_string(),
            to: to.trim().to_string(),
            date,
        };
        self.quick_search = Some(date);
        Step::Effect(effect)
    }

    pub fn on_outcome(&mut self, outcome: Outcome, ctx: &mut AppContext) -> Step {
        match outcome {
            Outcome::Account {
                profile,
                subscriptions,
                routes,
            } => {
                self.loading = false;
                ctx.set_profile(profile, subscriptions);
                if !self.editing {
                    self.draft = ProfileUpdate::from(ctx.profile());
                }
                self.routes = routes;
                Step::None
            }
            Outcome::ProfileSaved(update) => {
                self.saving = false;
                self.editing = false;
                ctx.apply_profile_update(&update);
                self.banner.notice("Profile updated successfully!");
                Step::None
            }
            Outcome::WalletFunded { amount, balance } => {
                ctx.set_wallet_balance(balance);
                self.show_funding = false;
                self.funding_amount.clear();
                self.banner.notice(format!("₦{} added to your wallet", amount));
                Step::None
            }
            Outcome::SupportSent => {
                self.sending_support = false;
                self.support_subject.clear();
                self.support_message.clear();
                self.support_expanded = false;
                self.banner
                    .notice("Your message has been sent to support. We will respond within 24 hours.");
                Step::None
            }
            Outcome::Unsubscribed(id) => {
                ctx.remove_subscription(id);
                self.banner.notice("Successfully unsubscribed from route");
                Step::None
            }
            Outcome::SearchResults { routes, date } => {
                self.quick_search = None;
                self.quick = QuickBooking {
                    date: self.quick.date.clone(),
                    ..Default::default()
                };
                ctx.set_search_results(routes);
                Step::navigate(Destination::SearchResults { date })
            }
            Outcome::SignedOut => Step::Intent(NavIntent::Complete(Completion::SignedOut)),
            Outcome::Failed(message) => {
                self.loading = false;
                self.saving = false;
                self.sending_support = false;
                self.quick_search = None;
                self.banner.error(message);
                Step::None
            }
            _ => Step::None,
        }
    }

    pub fn view(&self, ctx: &AppContext) -> ProfileView {
        let profile = ctx.profile();
        ProfileView {
            loading: self.loading && !ctx.profile_loaded(),
            editing: self.editing,
            saving: self.saving,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone_number: profile.phone_number.clone(),
            emergency_contact: profile.emergency_contact.clone(),
            draft: self.editing.then(|| self.draft.clone()),
            subscriptions: profile.subscriptions.iter().filter(|s| s.is_active).cloned().collect(),
            wallet: WalletView {
                balance: profile.wallet_balance,
                show_funding: self.show_funding,
                amount: self.funding_amount.clone(),
                method: self.funding_method,
            },
            support: SupportView {
                expanded: self.support_expanded,
                subject: self.support_subject.clone(),
                message: self.support_message.clone(),
                remaining: MAX_SUPPORT_MESSAGE_LEN.saturating_sub(self.support_message.chars().count()),
                sending: self.sending_support,
            },
            planner: PlannerView {
                routes: self.routes.clone(),
                route_id: self.planner.route_id,
                kind: self.planner.kind,
                weeks: self.planner.weeks,
                dates: self.planner.dates.dates().to_vec(),
                description: self.planner.plan().description(),
                fare: self.planner.fare(),
            },
            quick_booking: QuickBookingView {
                routes: profile.preferred_routes.clone(),
                route: self.quick.route.clone(),
                date: self.quick.date.clone(),
                date_error: self.quick.date_error.clone(),
            },
            banner: self.banner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_route, UserProfile};
    use crate::services::AuthSession;
    use chrono::{Datelike, Days, Weekday};

    fn ctx() -> AppContext {
        let mut ctx = AppContext::new();
        ctx.start(AuthSession {
            user_id: Uuid::from_u128(5),
            email: "ada@example.com".to_string(),
            access_token: "token".to_string(),
        });
        ctx
    }

    fn loaded(ctx: &mut AppContext) -> ProfileScreen {
        let mut screen = ProfileScreen::new(ctx);
        assert!(matches!(screen.on_mount(ctx), Step::Effect(Effect::LoadAccount)));
        screen.on_outcome(
            Outcome::Account {
                profile: Some(UserProfile {
                    full_name: "Ada Obi".to_string(),
                    wallet_balance: 500,
                    ..Default::default()
                }),
                subscriptions: vec![RouteSubscription {
                    id: Uuid::from_u128(40),
                    route: "Berger → Lekki Phase 1".to_string(),
                    duration_weeks: 2,
                    start_date: NaiveDate::from_ymd_opt(2024, 12, 16).unwrap(),
                    end_date: NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
                    discount: 0,
                    is_active: true,
                }],
                routes: vec![sample_route()],
            },
            ctx,
        );
        screen
    }

    #[test]
    fn test_account_load_fills_context() {
        let mut ctx = ctx();
        let screen = loaded(&mut ctx);
        let view = screen.view(&ctx);
        assert_eq!(view.full_name, "Ada Obi");
        assert_eq!(view.email, "ada@example.com");
        assert_eq!(view.wallet.balance, 500);
        assert_eq!(view.subscriptions.len(), 1);
        assert_eq!(view.quick_booking.routes.len(), 2);
    }

    #[test]
    fn test_wallet_minimum() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        screen.update(ProfileAction::SetFundingAmount { value: "99".to_string() }, &mut ctx);
        assert!(matches!(screen.update(ProfileAction::FundWallet, &mut ctx), Step::None));
        assert_eq!(screen.banner.error.as_deref(), Some("Minimum funding amount is ₦100"));

        screen.update(ProfileAction::SetFundingAmount { value: "2000".to_string() }, &mut ctx);
        assert!(matches!(
            screen.update(ProfileAction::FundWallet, &mut ctx),
            Step::Effect(Effect::FundWallet(2000))
        ));
        screen.on_outcome(Outcome::WalletFunded { amount: 2000, balance: 2500 }, &mut ctx);
        assert_eq!(ctx.profile().wallet_balance, 2500);
    }

    #[test]
    fn test_support_validation() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        screen.update(
            ProfileAction::SetSupport {
                subject: "Refund".to_string(),
                message: "x".repeat(501),
            },
            &mut ctx,
        );
        assert!(matches!(screen.update(ProfileAction::SendSupport, &mut ctx), Step::None));
        assert_eq!(screen.banner.error.as_deref(), Some("Message must be 500 characters or less"));

        screen.update(
            ProfileAction::SetSupport {
                subject: " ".to_string(),
                message: "Hello".to_string(),
            },
            &mut ctx,
        );
        screen.update(ProfileAction::SendSupport, &mut ctx);
        assert_eq!(screen.banner.error.as_deref(), Some("Please fill in both subject and message"));
    }

    #[test]
    fn test_unsubscribe_removes_from_context() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        let id = Uuid::from_u128(40);
        assert!(matches!(
            screen.update(ProfileAction::Unsubscribe { subscription_id: id }, &mut ctx),
            Step::Effect(Effect::Unsubscribe(_))
        ));
        screen.on_outcome(Outcome::Unsubscribed(id), &mut ctx);
        assert!(ctx.profile().subscriptions.is_empty());
    }

    #[test]
    fn test_planner_quotes() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        screen.update(ProfileAction::PlanRoute { route_id: sample_route().id }, &mut ctx);
        screen.update(ProfileAction::PlanWeeks { weeks: 9 }, &mut ctx);
        assert_eq!(screen.view(&ctx).planner.weeks, 4);
        let fare = screen.view(&ctx).planner.fare.unwrap();
        assert_eq!((fare.subtotal, fare.discount_percent, fare.total), (96_000, 5, 91_200));

        screen.update(ProfileAction::PlanType { kind: PlanKind::Custom }, &mut ctx);
        assert!(matches!(screen.update(ProfileAction::Subscribe, &mut ctx), Step::None));
        assert_eq!(
            screen.banner.error.as_deref(),
            Some("Please select at least one date for your custom subscription")
        );

        let mut monday = dates::today() + Days::new(1);
        while monday.weekday() != Weekday::Mon {
            monday = monday + Days::new(1);
        }
        screen.update(ProfileAction::PlanToggleDate { date: monday }, &mut ctx);
        screen.update(
            ProfileAction::PlanToggleDate {
                date: monday + Days::new(1),
            },
            &mut ctx,
        );
        let Step::Intent(NavIntent::NavigateTo(Destination::SubscriptionPayment { quote })) =
            screen.update(ProfileAction::Subscribe, &mut ctx)
        else {
            panic!("expected the payment screen");
        };
        assert_eq!(quote.fare.subtotal, 9_600);
        assert_eq!(quote.fare.total, 9_120);
        assert_eq!(quote.duration_weeks(), 1);
    }

    #[test]
    fn test_quick_booking_searches_then_shows_results() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        screen.update(
            ProfileAction::QuickRoute {
                route: "TBS - Ikorodu".to_string(),
            },
            &mut ctx,
        );
        let Step::Effect(Effect::SearchRoutes { from, to, date }) = screen.update(ProfileAction::QuickBook, &mut ctx)
        else {
            panic!("expected a search");
        };
        assert_eq!((from.as_str(), to.as_str()), ("TBS", "Ikorodu"));

        let step = screen.on_outcome(
            Outcome::SearchResults {
                routes: vec![sample_route()],
                date,
            },
            &mut ctx,
        );
        assert!(matches!(
            step,
            Step::Intent(NavIntent::NavigateTo(Destination::SearchResults { .. }))
        ));
        assert_eq!(ctx.search_results().len(), 1);
    }

    #[test]
    fn test_quick_booking_rejects_weekend() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        screen.update(
            ProfileAction::QuickRoute {
                route: "TBS - Ikorodu".to_string(),
            },
            &mut ctx,
        );
        screen.update(ProfileAction::QuickDate { value: "2024-12-22".to_string() }, &mut ctx);
        assert_eq!(screen.view(&ctx).quick_booking.date_error.as_deref(), Some(NOT_A_WORKING_DAY));
        assert!(matches!(screen.update(ProfileAction::QuickBook, &mut ctx), Step::None));
    }

    #[test]
    fn test_edit_and_save() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        screen.update(ProfileAction::Edit, &mut ctx);
        let mut draft = ProfileUpdate::from(ctx.profile());
        draft.phone_number = "08039999999".to_string();
        screen.update(ProfileAction::ChangeDraft(draft.clone()), &mut ctx);
        assert!(matches!(
            screen.update(ProfileAction::Save, &mut ctx),
            Step::Effect(Effect::SaveProfile(_))
        ));
        screen.on_outcome(Outcome::ProfileSaved(draft), &mut ctx);
        assert_eq!(ctx.profile().phone_number, "08039999999");
        assert!(!screen.view(&ctx).editing);
    }

    #[test]
    fn test_sign_out_completes() {
        let mut ctx = ctx();
        let mut screen = loaded(&mut ctx);
        assert!(matches!(
            screen.update(ProfileAction::SignOut, &mut ctx),
            Step::Effect(Effect::SignOut)
        ));
        assert!(matches!(
            screen.on_outcome(Outcome::SignedOut, &mut ctx),
            Step::Intent(NavIntent::Complete(Completion::SignedOut))
        ));
    }
}
