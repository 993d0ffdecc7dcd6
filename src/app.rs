//! Per-client runtime.
//!
//! An [`App`] ties one navigator, one application context and the mounted
//! screen together. A [`Session`] wraps it for concurrent use: backend work
//! runs with the lock released, and its result is applied only if the scope
//! that started it is still the current one.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::context::AppContext;
use crate::effects::{self, Effect, EffectEnv, Outcome};
use crate::models::RouteSubscription;
use crate::navigation::{Completion, NavIntent, Navigator, PaymentReceipt, Screen};
use crate::scope::{Scope, ScopeId, ScopeKind, ScopeToken};
use crate::screens::{Action, ScreenBody, ScreenState, Step};
use crate::services::Services;

/// Everything the renderer needs to draw the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenView {
    pub screen: Screen,
    pub can_go_back: bool,
    pub signed_in: bool,
    pub body: ScreenBody,
}

/// Backend work waiting to run outside the lock.
#[derive(Debug)]
pub struct Job {
    effect: Effect,
    token: ScopeToken,
    env: EffectEnv,
}

impl Job {
    pub fn scope(&self) -> ScopeId {
        self.token.id()
    }
}

#[derive(Debug)]
pub struct App {
    navigator: Navigator,
    ctx: AppContext,
    screen: ScreenState,
    mounted_epoch: u64,
    screen_scope: Scope,
    session_scope: Scope,
    serial: u64,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let navigator = Navigator::new();
        let ctx = AppContext::new();
        let screen = ScreenState::build(navigator.current(), navigator.slots(), &ctx);
        Self {
            mounted_epoch: navigator.epoch(),
            navigator,
            ctx,
            screen,
            screen_scope: Scope::new(ScopeKind::Screen, 0),
            session_scope: Scope::new(ScopeKind::Session, 0),
            serial: 0,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn view(&self) -> ScreenView {
        ScreenView {
            screen: self.screen.screen(),
            can_go_back: self.navigator.history().len() > 1,
            signed_in: self.ctx.is_authenticated(),
            body: self.screen.view(&self.ctx),
        }
    }

    fn next_scope(&mut self, kind: ScopeKind) -> Scope {
        self.serial += 1;
        Scope::new(kind, self.serial)
    }

    fn job(&self, effect: Effect, kind: ScopeKind) -> Job {
        let scope = match kind {
            ScopeKind::Screen => &self.screen_scope,
            ScopeKind::Session => &self.session_scope,
        };
        Job {
            effect,
            token: scope.token(),
            env: EffectEnv {
                session: self.ctx.session().cloned(),
                profile: self.ctx.profile().clone(),
            },
        }
    }

    /// Hand a user action to the mounted screen.
    pub fn handle(&mut self, action: Action) -> Vec<Job> {
        let mut jobs = Vec::new();
        let step = self.screen.update(action, &mut self.ctx);
        self.apply(step, &mut jobs);
        jobs
    }

    /// Apply the result of a job. Results for a scope that has since been
    /// replaced are dropped.
    pub fn deliver(&mut self, scope: ScopeId, outcome: Outcome) -> Vec<Job> {
        let mut jobs = Vec::new();
        match scope.kind {
            ScopeKind::Session if scope == self.session_scope.id() => self.on_session_outcome(outcome),
            ScopeKind::Screen if scope == self.screen_scope.id() => {
                let step = self.screen.on_outcome(outcome, &mut self.ctx);
                self.apply(step, &mut jobs);
            }
            _ => tracing::debug!(?scope, ?outcome, "Dropping result of a finished scope"),
        }
        jobs
    }

    fn on_session_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Profile { profile, subscriptions } => self.ctx.set_profile(profile, subscriptions),
            Outcome::Failed(message) => tracing::warn!(%message, "Profile load failed"),
            other => tracing::debug!(outcome = ?other, "Unexpected session outcome"),
        }
    }

    fn apply(&mut self, step: Step, jobs: &mut Vec<Job>) {
        match step {
            Step::None => {}
            Step::Effect(effect) => jobs.push(self.job(effect, ScopeKind::Screen)),
            Step::Intent(intent) => self.navigate(intent, jobs),
        }
    }

    fn navigate(&mut self, intent: NavIntent, jobs: &mut Vec<Job>) {
        let completion = match &intent {
            NavIntent::Complete(completion) => Some(completion.clone()),
            _ => None,
        };
        if !self.navigator.apply(intent) {
            tracing::debug!(?completion, "Navigation ignored");
            return;
        }

        match completion {
            Some(Completion::SignedIn) => {
                self.session_scope = self.next_scope(ScopeKind::Session);
                jobs.push(self.job(Effect::LoadProfile, ScopeKind::Session));
            }
            Some(Completion::SignedOut) => {
                self.session_scope = self.next_scope(ScopeKind::Session);
                self.ctx.teardown();
            }
            Some(Completion::SubscriptionPayment(subscription))
            | Some(Completion::Payment(PaymentReceipt::Subscribed(subscription))) => {
                self.add_subscription(subscription)
            }
            _ => {}
        }

        self.remount(jobs);
    }

    fn add_subscription(&mut self, subscription: RouteSubscription) {
        tracing::info!(subscription_id = %subscription.id, route = %subscription.route, "Subscription added");
        self.ctx.add_subscription(subscription);
    }

    /// Replace the mounted screen if the navigator moved. The old screen's
    /// scope is dropped with it.
    fn remount(&mut self, jobs: &mut Vec<Job>) {
        if self.navigator.epoch() == self.mounted_epoch {
            return;
        }
        self.mounted_epoch = self.navigator.epoch();
        self.screen_scope = self.next_scope(ScopeKind::Screen);
        self.screen = ScreenState::build(self.navigator.current(), self.navigator.slots(), &self.ctx);
        tracing::debug!(screen = ?self.screen.screen(), "Screen mounted");

        let step = self.screen.on_mount(&self.ctx);
        self.apply(step, jobs);
    }

    /// Release everything the session holds.
    pub fn close(&mut self) {
        self.screen_scope.cancel();
        self.session_scope.cancel();
        self.screen = ScreenState::Blank(Screen::Login);
        self.ctx.teardown();
        self.navigator = Navigator::new();
        self.mounted_epoch = self.navigator.epoch();
    }
}

/// One connected client.
pub struct Session {
    app: Mutex<App>,
    services: Services,
    last_seen: Mutex<Instant>,
}

impl Session {
    pub fn new(services: Services) -> Self {
        Self {
            app: Mutex::new(App::new()),
            services,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Mark the client as active.
    pub async fn touch(&self) {
        *self.last_seen.lock().await = Instant::now();
    }

    pub async fn idle_for(&self) -> Duration {
        self.last_seen.lock().await.elapsed()
    }

    pub async fn view(&self) -> ScreenView {
        self.app.lock().await.view()
    }

    /// Apply `action` and every effect it leads to, then return the view.
    pub async fn dispatch(&self, action: Action) -> ScreenView {
        let jobs = self.app.lock().await.handle(action);
        self.run(jobs).await;
        self.view().await
    }

    async fn run(&self, jobs: Vec<Job>) {
        let mut queue: VecDeque<Job> = jobs.into();
        while let Some(Job { effect, token, env }) = queue.pop_front() {
            let name = effect.name();
            tracing::debug!(effect = name, scope = ?token.id(), "Running effect");

            match token.guard(effects::run(effect, &self.services, &env)).await {
                Some(outcome) => {
                    let follow_up = self.app.lock().await.deliver(token.id(), outcome);
                    queue.extend(follow_up);
                }
                None => tracing::debug!(effect = name, "Effect cancelled"),
            }
        }
    }

    pub async fn close(&self) {
        self.app.lock().await.close();
        tracing::debug!("Session closed");
    }
}
