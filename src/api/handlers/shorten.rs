//! Handler for link shortening endpoint.

use axum::{Json, extract::State};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::extract::ValidatedJson;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_url": "http://localhost:8082/Ab3x_Q",
///   "short_code": "Ab3x_Q",
///   "original_url": "https://example.com"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or `url` is missing/empty.
/// Returns 500 Internal Server Error if the link cannot be stored.
pub async fn shorten_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    let link = state.link_service.create_short_link(payload.url).await?;

    let short_url = state.link_service.short_url(&link.short_code);

    Ok(Json(ShortenResponse {
        short_url,
        short_code: link.short_code,
        original_url: link.original_url,
    }))
}
