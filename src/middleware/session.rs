use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Bearer token of the session a request belongs to.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Resolve the bearer token to a live session and attach it to the request.
pub async fn session_middleware(
    State(state): State<AppState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = auth.token().to_string();
    let session = state
        .sessions
        .read()
        .await
        .get(&token)
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Unknown or expired session".to_string()))?;
    session.touch().await;

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}
