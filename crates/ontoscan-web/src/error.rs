//! Error responses for the JSON API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ontoscan_common::OntoscanError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error, rendered as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub OntoscanError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            OntoscanError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            e if e.is_upstream() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OntoscanError> for ApiError {
    fn from(e: OntoscanError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self.0, "Request failed");
        } else {
            warn!(status = %status, error = %self.0, "Request rejected");
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}
