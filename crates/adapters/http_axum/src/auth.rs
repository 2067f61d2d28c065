//! Shared-secret authentication.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject the request with `403` unless `X-API-Key` equals the configured key.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the header is missing or wrong.
pub async fn require_api_key(
    State(api_key): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == &*api_key => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "invalid API key provided");
            Err(ApiError::Unauthorized)
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "missing API key in request");
            Err(ApiError::Unauthorized)
        }
    }
}
