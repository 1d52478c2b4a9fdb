use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::core::error::AssistantError;

pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub fn status_of(err: &AssistantError) -> StatusCode {
    match err {
        AssistantError::Validation(_) => StatusCode::BAD_REQUEST,
        AssistantError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AssistantError::ModelFailure(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        }
        error(status, self.to_string())
    }
}
