use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub backend_url: String,
    pub backend_anon_key: String,
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub payment_delay: Duration,
    pub tracking_poll_interval: Duration,
    /// Sessions with no request for this long are closed.
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            backend_url: required("BACKEND_URL")?,
            backend_anon_key: required("BACKEND_ANON_KEY")?,
            database_url: required("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parsed("SERVER_PORT", 3000)?,
            payment_delay: Duration::from_millis(parsed("PAYMENT_DELAY_MS", 1500)?),
            tracking_poll_interval: Duration::from_secs(parsed("TRACKING_POLL_SECS", 5)?),
            session_idle_timeout: Duration::from_secs(parsed("SESSION_IDLE_SECS", 1800)?),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> AppResult<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} must be set", key))),
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number", key))),
        Err(_) => Ok(default),
    }
}
