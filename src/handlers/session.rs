use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::app::{ScreenView, Session};
use crate::middleware::session::SessionToken;
use crate::screens::Action;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub token: String,
    pub view: ScreenView,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.read().await.len(),
    })
}

/// Start a client session on the login screen
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let token = Uuid::new_v4().simple().to_string();
    let session = Arc::new(Session::new(state.services.clone()));
    let view = session.view().await;

    let active = {
        let mut sessions = state.sessions.write().await;
        sessions.insert(token.clone(), session);
        sessions.len()
    };
    tracing::info!(active, "Session created");

    (StatusCode::CREATED, Json(SessionCreated { token, view }))
}

pub async fn current_view(Extension(session): Extension<Arc<Session>>) -> Json<ScreenView> {
    Json(session.view().await)
}

/// Apply one user action and return the screen it leads to
pub async fn post_action(
    Extension(session): Extension<Arc<Session>>,
    Json(action): Json<Action>,
) -> Json<ScreenView> {
    Json(session.dispatch(action).await)
}

pub async fn close_session(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Extension(session): Extension<Arc<Session>>,
) -> StatusCode {
    state.sessions.write().await.remove(&token);
    session.close().await;
    StatusCode::NO_CONTENT
}
