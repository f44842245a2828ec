//! Mapping of [`ScrapeApiError`] onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use scrapeapi_shared::ScrapeApiError;

/// A request failure rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub ScrapeApiError);

impl From<ScrapeApiError> for ApiError {
    fn from(err: ScrapeApiError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScrapeApiError::InvalidUrl { .. } | ScrapeApiError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            ScrapeApiError::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
