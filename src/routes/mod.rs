//! Route modules for the thumbnail service

pub mod events;
pub mod files;
pub mod health;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/v1/health", health::router())
        .nest("/api/v1/events", events::router())
        .nest("/api/v1/files", files::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
