//! Application wiring. Builds every collaborator over one key-value store
//! and merges the route sets into a single router.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::advisor::{ChatRouteState, ChatSessions, Responder, chat_routes};
use crate::auth::{AuthRouteState, SessionHolder, auth_routes};
use crate::catalog::{CatalogRouteState, ProductCatalog, catalog_routes};
use crate::config::AdminCredentials;
use crate::error::Result;
use crate::store::KeyValueStore;
use crate::visitor;

/// Everything the HTTP layer needs.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ProductCatalog>,
    pub sessions: Arc<SessionHolder>,
    pub chats: Arc<ChatSessions>,
}

impl AppState {
    /// Load the catalog and the stored session, and resolve the visitor id.
    pub async fn build(
        store: Arc<dyn KeyValueStore>,
        admin: AdminCredentials,
        responder: Arc<dyn Responder>,
    ) -> Result<Self> {
        let catalog = ProductCatalog::load(Arc::clone(&store)).await?;
        let sessions = SessionHolder::restore(Arc::clone(&store), admin).await?;
        let visitor_id = visitor::visitor_id(store.as_ref()).await?;

        Ok(Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(sessions),
            chats: Arc::new(ChatSessions::new(responder, Some(visitor_id))),
        })
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "instastore"
    }))
}

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(catalog_routes(CatalogRouteState {
            catalog: Arc::clone(&state.catalog),
            sessions: Arc::clone(&state.sessions),
        }))
        .merge(auth_routes(AuthRouteState {
            sessions: Arc::clone(&state.sessions),
        }))
        .merge(chat_routes(ChatRouteState {
            sessions: Arc::clone(&state.chats),
            catalog: Arc::clone(&state.catalog),
        }))
        .layer(CorsLayer::permissive())
}
