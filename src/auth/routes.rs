//! REST endpoints for login, logout and the current identity.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use super::SessionHolder;
use crate::error::AuthError;

/// Shared state for auth routes.
#[derive(Clone)]
pub struct AuthRouteState {
    pub sessions: Arc<SessionHolder>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// POST /api/auth/login
///
/// Returns `{token, email, isAdmin}`.
async fn login(
    State(state): State<AuthRouteState>,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.sessions.login(&body.email, &body.password).await {
        Ok(login) => Json(login).into_response(),
        Err(AuthError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Invalid email or password"})),
        )
            .into_response(),
        Err(e) => storage_failure(e),
    }
}

/// POST /api/auth/logout
///
/// Forgets the presented token. Always 204 unless storage fails.
async fn logout(State(state): State<AuthRouteState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match state.sessions.logout(token).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/auth/me
///
/// Returns the identity behind the presented token, or 401.
async fn me(State(state): State<AuthRouteState>, headers: HeaderMap) -> impl IntoResponse {
    let identity = match bearer_token(&headers) {
        Some(token) => state.sessions.identity(token).await,
        None => None,
    };
    match identity {
        Some(identity) => Json(identity).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Not logged in"})),
        )
            .into_response(),
    }
}

fn storage_failure(e: AuthError) -> axum::response::Response {
    warn!(error = %e, "Session storage failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}

/// Build the auth REST routes.
pub fn auth_routes(state: AuthRouteState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc-123")), Some("abc-123"));
    }

    #[test]
    fn ignores_missing_or_foreign_schemes() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("Bearer   ")), None);
    }
}
