//! Web server module.
//!
//! Routes:
//! - `GET /health`
//! - `POST /webhook`: provider callback carrying the generated image
//! - `POST /swap_face`: relays a face-swap request to the configured API
//!
//! Both POST routes accept any method at the router level so the handlers
//! can answer 405 themselves.

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, image_webhook, swap_face, AppState, HealthResponse};

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/webhook", any(image_webhook))
        .route("/swap_face", any(swap_face))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
