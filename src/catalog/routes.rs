//! REST endpoints for the public catalog and the admin product panel.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tracing::warn;

use super::model::{ProductDraft, ProductPatch};
use super::repository::ProductCatalog;
use crate::auth::{SessionHolder, bearer_token};
use crate::error::CatalogError;

/// Shared state for catalog routes.
#[derive(Clone)]
pub struct CatalogRouteState {
    pub catalog: Arc<ProductCatalog>,
    pub sessions: Arc<SessionHolder>,
}

// ── Public ──────────────────────────────────────────────────────────────

async fn list_products(State(state): State<CatalogRouteState>) -> impl IntoResponse {
    Json(state.catalog.list().await)
}

async fn get_product(
    State(state): State<CatalogRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.catalog.get(&id).await {
        Some(product) => Json(product).into_response(),
        None => catalog_error(CatalogError::NotFound { id }),
    }
}

// ── Admin ───────────────────────────────────────────────────────────────

async fn create_product(
    State(state): State<CatalogRouteState>,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> Response {
    if !is_admin(&state, &headers).await {
        return forbidden();
    }
    match state.catalog.create(draft).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => catalog_error(e),
    }
}

async fn update_product(
    State(state): State<CatalogRouteState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<ProductPatch>,
) -> Response {
    if !is_admin(&state, &headers).await {
        return forbidden();
    }
    match state.catalog.update(&id, patch).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => catalog_error(e),
    }
}

async fn delete_product(
    State(state): State<CatalogRouteState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_admin(&state, &headers).await {
        return forbidden();
    }
    match state.catalog.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => catalog_error(e),
    }
}

/// Admin routes need a bearer token issued to an admin login.
async fn is_admin(state: &CatalogRouteState, headers: &HeaderMap) -> bool {
    match bearer_token(headers) {
        Some(token) => state.sessions.is_admin(token).await,
        None => false,
    }
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({"error": "Admin login required"})),
    )
        .into_response()
}

fn catalog_error(e: CatalogError) -> Response {
    let status = match &e {
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Storage(_) => {
            warn!(error = %e, "Catalog storage failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(serde_json::json!({"error": e.to_string()}))).into_response()
}

/// Build the catalog REST routes.
pub fn catalog_routes(state: CatalogRouteState) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/admin/products", post(create_product))
        .route(
            "/api/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .with_state(state)
}
