use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::session;
use crate::middleware::session::session_middleware;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Needs the bearer token handed out by POST /api/sessions
    let session_routes = Router::new()
        .route(
            "/api/session",
            get(session::current_view).delete(session::close_session),
        )
        .route("/api/session/actions", post(session::post_action))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    Router::new()
        .route("/health", get(session::health))
        .route("/api/sessions", post(session::create_session))
        .merge(session_routes)
        .with_state(state)
}
