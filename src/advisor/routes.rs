//! REST endpoints for the product advisor chat.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engine::{ConversationEngine, Rejection, SubmitOutcome};
use super::model::Turn;
use super::sessions::ChatSessions;
use super::state::ConversationState;
use crate::catalog::ProductCatalog;

/// Shared state for chat routes.
#[derive(Clone)]
pub struct ChatRouteState {
    pub sessions: Arc<ChatSessions>,
    pub catalog: Arc<ProductCatalog>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenSessionRequest {
    product_id: String,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    text: String,
}

/// A session as the widget sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    session_id: Uuid,
    product_id: String,
    #[serde(flatten)]
    state: ConversationState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitView {
    advisor_turn: Option<Turn>,
    notice: Option<String>,
    #[serde(flatten)]
    session: SessionView,
}

fn session_view(id: Uuid, engine: &ConversationEngine) -> SessionView {
    SessionView {
        session_id: id,
        product_id: engine.product_id().to_string(),
        state: engine.snapshot(),
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({"error": message}))).into_response()
}

/// POST /api/chat/sessions
async fn open_session(
    State(state): State<ChatRouteState>,
    Json(body): Json<OpenSessionRequest>,
) -> Response {
    if state.catalog.get(&body.product_id).await.is_none() {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    let (id, engine) = state.sessions.open(&body.product_id).await;
    (StatusCode::CREATED, Json(session_view(id, &engine))).into_response()
}

/// GET /api/chat/sessions/{id}
async fn get_session(State(state): State<ChatRouteState>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.get(id).await {
        Some(engine) => Json(session_view(id, &engine)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Chat session not found"),
    }
}

/// POST /api/chat/sessions/{id}/messages
///
/// 409 while the previous message is still being answered, 422 for blank
/// text. A webhook failure is still a 200 with a `notice`.
async fn submit_message(
    State(state): State<ChatRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitRequest>,
) -> Response {
    let Some(engine) = state.sessions.get(id).await else {
        return error(StatusCode::NOT_FOUND, "Chat session not found");
    };

    match engine.submit(&body.text).await {
        SubmitOutcome::Accepted(report) => Json(SubmitView {
            advisor_turn: report.advisor_turn,
            notice: report.notice,
            session: session_view(id, &engine),
        })
        .into_response(),
        SubmitOutcome::Rejected(Rejection::Pending) => error(
            StatusCode::CONFLICT,
            "The advisor is still answering the previous message",
        ),
        SubmitOutcome::Rejected(Rejection::Blank) => {
            error(StatusCode::UNPROCESSABLE_ENTITY, "Message is empty")
        }
    }
}

/// DELETE /api/chat/sessions/{id}
async fn close_session(State(state): State<ChatRouteState>, Path(id): Path<Uuid>) -> Response {
    if state.sessions.close(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Chat session not found")
    }
}

/// Build the chat REST routes.
pub fn chat_routes(state: ChatRouteState) -> Router {
    Router::new()
        .route("/api/chat/sessions", post(open_session))
        .route(
            "/api/chat/sessions/{id}",
            get(get_session).delete(close_session),
        )
        .route("/api/chat/sessions/{id}/messages", post(submit_message))
        .with_state(state)
}
