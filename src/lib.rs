pub mod app;
pub mod config;
pub mod context;
pub mod db;
pub mod effects;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod routes;
pub mod scope;
pub mod screens;
pub mod services;
pub mod utils;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub use app::{ScreenView, Session};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::Services;

/// Connected clients keyed by their bearer token.
pub type Sessions = Arc<RwLock<HashMap<String, Arc<Session>>>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Sessions,
    pub services: Services,
    pub config: Config,
}

impl AppState {
    pub fn new(services: Services, config: Config) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            services,
            config,
        }
    }

    /// Close and forget every session idle for at least `ttl`.
    pub async fn sweep_idle_sessions(&self, ttl: Duration) -> usize {
        let expired: Vec<(String, Arc<Session>)> = {
            let mut sessions = self.sessions.write().await;
            let mut expired = Vec::new();
            for (token, session) in sessions.iter() {
                if session.idle_for().await >= ttl {
                    expired.push((token.clone(), session.clone()));
                }
            }
            for (token, _) in &expired {
                sessions.remove(token);
            }
            expired
        };

        for (_, session) in &expired {
            session.close().await;
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Closed idle sessions");
        }
        expired.len()
    }

    /// Sweep idle sessions in the background, checking every `ttl / 4`.
    pub fn spawn_session_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let ttl = self.config.session_idle_timeout;
        let period = (ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.sweep_idle_sessions(ttl).await;
            }
        })
    }
}
