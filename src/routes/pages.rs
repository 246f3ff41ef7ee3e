//! Page serving routes
//!
//! `GET /up/:slug` renders a stored page inline.

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::error::Result;
use crate::state::AppState;

/// Create the pages router
pub fn router() -> Router<AppState> {
    Router::new().route("/:slug", get(render_page))
}

/// Render a stored page
///
/// Content is served as stored (after the configured sanitizer) and is
/// never cached by the server.
async fn render_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let page = state.resolver().resolve(&slug).await?;

    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Html(page.html_content),
    ))
}
