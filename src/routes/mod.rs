//! Route modules for the htmlup server

pub mod catalog;
pub mod form;
pub mod health;
pub mod pages;
pub mod upload;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let max_body_bytes = state.config().upload.max_body_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(form::router())
        .nest("/health", health::router())
        .nest("/api/upload", upload::router(max_body_bytes))
        .nest("/api/pages", catalog::router())
        .nest("/up", pages::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
