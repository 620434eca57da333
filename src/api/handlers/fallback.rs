//! Handler for paths and methods no route serves.

use serde_json::Value;

use crate::error::AppError;

/// Answers unmatched requests the way an unknown short code is answered.
///
/// Covers both unknown paths (`GET /`) and known paths with the wrong method
/// (`GET /shorten`), so clients always get a JSON `404`.
pub async fn not_found_handler() -> AppError {
    AppError::not_found("URL not found", Value::Null)
}
