//! API route configuration.

use crate::api::handlers::{
    health_handler, not_found_handler, redirect_handler, shorten_handler, stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All public routes.
///
/// # Endpoints
///
/// - `POST /shorten`       - Create a short link
/// - `GET  /stats/{code}`  - Statistics for a specific link
/// - `GET  /health`        - Health check
/// - `GET  /{code}`        - Redirect to the original URL
///
/// Anything else, including a wrong method on a known path, is answered with
/// `404 {"error": "URL not found"}`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats/{code}", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .method_not_allowed_fallback(not_found_handler)
        .fallback(not_found_handler)
}
