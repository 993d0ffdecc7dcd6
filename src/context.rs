//! Per-session application context.
//!
//! Created empty, started when a user signs in and torn down on sign-out.
//! Screens receive it explicitly and change it only through these setters.

use uuid::Uuid;

use crate::models::{ProfileUpdate, Route, RouteSubscription, UserProfile, PREFERRED_ROUTES};
use crate::services::AuthSession;

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    session: Option<AuthSession>,
    profile: UserProfile,
    profile_loaded: bool,
    search_results: Vec<Route>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a signed-in session. The profile starts from what the auth
    /// service knows and is replaced once the stored row has been read.
    pub fn start(&mut self, session: AuthSession) {
        tracing::info!(user_id = %session.user_id, "Session started");
        self.profile = UserProfile {
            email: session.email.clone(),
            preferred_routes: PREFERRED_ROUTES.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        };
        self.profile_loaded = false;
        self.search_results.clear();
        self.session = Some(session);
    }

    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(user_id = %session.user_id, "Session ended");
        }
        *self = Self::default();
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn profile_loaded(&self) -> bool {
        self.profile_loaded
    }

    /// Replace the profile with the stored one. Missing fields keep what the
    /// session already knew.
    pub fn set_profile(&mut self, stored: Option<UserProfile>, subscriptions: Vec<RouteSubscription>) {
        if let Some(stored) = stored {
            let email = std::mem::take(&mut self.profile.email);
            self.profile = stored;
            if self.profile.email.is_empty() {
                self.profile.email = email;
            }
            if self.profile.preferred_routes.is_empty() {
                self.profile.preferred_routes = PREFERRED_ROUTES.iter().map(|r| r.to_string()).collect();
            }
        }
        self.profile.subscriptions = subscriptions;
        self.profile_loaded = true;
    }

    pub fn apply_profile_update(&mut self, update: &ProfileUpdate) {
        self.profile.full_name = update.full_name.clone();
        self.profile.phone_number = update.phone_number.clone();
        self.profile.email = update.email.clone();
        self.profile.emergency_contact = update.emergency_contact.clone();
    }

    pub fn add_subscription(&mut self, subscription: RouteSubscription) {
        self.profile.subscriptions.push(subscription);
    }

    pub fn remove_subscription(&mut self, subscription_id: Uuid) {
        self.profile.subscriptions.retain(|s| s.id != subscription_id);
    }

    pub fn set_wallet_balance(&mut self, balance: i64) {
        self.profile.wallet_balance = balance;
    }

    pub fn search_results(&self) -> &[Route] {
        &self.search_results
    }

    pub fn set_search_results(&mut self, routes: Vec<Route>) {
        self.search_results = routes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_route;

    fn session() -> AuthSession {
        AuthSession {
            user_id: Uuid::from_u128(5),
            email: "ada@example.com".to_string(),
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn test_start_and_teardown() {
        let mut ctx = AppContext::new();
        assert!(!ctx.is_authenticated());

        ctx.start(session());
        assert_eq!(ctx.user_id(), Some(Uuid::from_u128(5)));
        assert_eq!(ctx.profile().email, "ada@example.com");
        assert_eq!(ctx.profile().preferred_routes.len(), 2);

        ctx.set_search_results(vec![sample_route()]);
        ctx.teardown();
        assert!(!ctx.is_authenticated());
        assert!(ctx.search_results().is_empty());
        assert_eq!(ctx.profile(), &UserProfile::default());
    }

    #[test]
    fn test_stored_profile_keeps_session_email_when_blank() {
        let mut ctx = AppContext::new();
        ctx.start(session());
        ctx.set_profile(
            Some(UserProfile {
                full_name: "Ada Obi".to_string(),
                wallet_balance: 1500,
                ..Default::default()
            }),
            Vec::new(),
        );
        assert!(ctx.profile_loaded());
        assert_eq!(ctx.profile().full_name, "Ada Obi");
        assert_eq!(ctx.profile().email, "ada@example.com");
        assert_eq!(ctx.profile().wallet_balance, 1500);
    }
}
