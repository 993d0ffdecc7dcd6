//! Client for the hosted auth service (`{BACKEND_URL}/auth/v1`).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{AuthProvider, AuthSession, SignUpRequest};

#[derive(Clone)]
pub struct HostedAuth {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    full_name: &'a str,
    phone_number: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Token grant, or the bare user when e-mail confirmation is pending.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HostedAuth {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", config.backend_url.trim_end_matches('/')),
            anon_key: config.backend_anon_key.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> AppResult<String> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .error_description
            .or(parsed.msg)
            .or(parsed.message)
            .unwrap_or_else(|| format!("auth service returned {}", status));

        Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            _ => AppError::Backend(message),
        })
    }

    fn session(body: &str, fallback_email: &str) -> AppResult<AuthSession> {
        let parsed: AuthResponse = serde_json::from_str(body)
            .map_err(|e| AppError::Backend(format!("invalid auth response: {}", e)))?;

        let (user_id, email) = match (parsed.user, parsed.id) {
            (Some(user), _) => (user.id, user.email),
            (None, Some(id)) => (id, parsed.email),
            (None, None) => return Err(AppError::Backend("auth response carries no user".to_string())),
        };

        Ok(AuthSession {
            user_id,
            email: email.unwrap_or_else(|| fallback_email.to_string()),
            access_token: parsed.access_token.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl AuthProvider for HostedAuth {
    async fn sign_up(&self, request: &SignUpRequest) -> AppResult<AuthSession> {
        let body = SignUpBody {
            email: &request.email,
            password: &request.password,
            data: SignUpMetadata {
                full_name: &request.full_name,
                phone_number: &request.phone_number,
            },
        };
        let resp = self.send(self.request(reqwest::Method::POST, "/signup").json(&body)).await?;
        let session = Self::session(&resp, &request.email)?;
        tracing::info!(user_id = %session.user_id, "Account created");
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let resp = self
            .send(
                self.request(reqwest::Method::POST, "/token")
                    .query(&[("grant_type", "password")])
                    .json(&Credentials { email, password }),
            )
            .await?;
        Self::session(&resp, email)
    }

    async fn sign_out(&self, session: &AuthSession) -> AppResult<()> {
        self.send(
            self.request(reqwest::Method::POST, "/logout")
                .bearer_auth(&session.access_token),
        )
        .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> AppResult<()> {
        self.send(
            self.request(reqwest::Method::POST, "/recover")
                .json(&serde_json::json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn update_password(&self, session: &AuthSession, password: &str) -> AppResult<()> {
        self.send(
            self.request(reqwest::Method::PUT, "/user")
                .bearer_auth(&session.access_token)
                .json(&serde_json::json!({ "password": password })),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_token_grant() {
        let body = r#"{"access_token":"abc","token_type":"bearer","user":{"id":"00000000-0000-0000-0000-000000000007","email":"ada@example.com"}}"#;
        let session = HostedAuth::session(body, "other@example.com").unwrap();
        assert_eq!(session.user_id, Uuid::from_u128(7));
        assert_eq!(session.email, "ada@example.com");
        assert_eq!(session.access_token, "abc");
    }

    #[test]
    fn test_session_from_unconfirmed_signup() {
        let body = r#"{"id":"00000000-0000-0000-0000-000000000009","email":null}"#;
        let session = HostedAuth::session(body, "new@example.com").unwrap();
        assert_eq!(session.user_id, Uuid::from_u128(9));
        assert_eq!(session.email, "new@example.com");
        assert!(session.access_token.is_empty());
    }

    #[test]
    fn test_session_without_user_is_backend_error() {
        assert!(matches!(HostedAuth::session("{}", "x@example.com"), Err(AppError::Backend(_))));
    }
}
