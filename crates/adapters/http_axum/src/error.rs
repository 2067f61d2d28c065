//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use relayhub_domain::error::RelayHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`RelayHubError`] and authentication failures to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or wrong `X-API-Key`.
    Unauthorized,
    Domain(RelayHubError),
}

impl From<RelayHubError> for ApiError {
    fn from(err: RelayHubError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized => (StatusCode::FORBIDDEN, "Invalid key".to_string()),
            Self::Domain(RelayHubError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(RelayHubError::InvalidPort(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(RelayHubError::Hardware(err)) => {
                tracing::error!(error = %err, "hardware error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "hardware write failure".to_string(),
                )
            }
            Self::Domain(RelayHubError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
