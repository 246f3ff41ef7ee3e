//! Page catalog routes
//!
//! - GET /api/pages - list every stored page
//! - POST /api/pages/refresh - rebuild the known-slug index

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::naming;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PageSummary {
    pub slug: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageListResponse {
    pub pages: Vec<PageSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub indexed: usize,
}

/// Create the catalog router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pages))
        .route("/refresh", post(refresh_index))
}

/// List all pages currently in the store
async fn list_pages(State(state): State<AppState>) -> Result<Json<PageListResponse>> {
    let slugs = state.resolver().list_known_slugs().await?;

    let pages: Vec<PageSummary> = slugs
        .into_iter()
        .map(|slug| PageSummary {
            url: naming::public_url(&slug),
            slug,
        })
        .collect();

    let total = pages.len();
    Ok(Json(PageListResponse { pages, total }))
}

/// Rebuild the page index from the store
async fn refresh_index(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    let indexed = state.resolver().refresh_index().await?;
    Ok(Json(RefreshResponse { indexed }))
}
