use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::infra::http::json as http_json;

#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    #[serde(default)]
    pub input: Option<String>,
}

/// `GET /v1/tools`
pub async fn list(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "tools": state.orchestrator.registry().list() }))
}

/// `POST /v1/tools/:name`. A failed tool is still a 200 with `success: false`.
pub async fn call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<ToolCallRequest>,
) -> Response {
    let input = req.input.unwrap_or_default();
    if input.trim().is_empty() {
        return http_json::error(StatusCode::BAD_REQUEST, "No input provided");
    }
    match state.orchestrator.invoke_tool(&name, input.trim()).await {
        Some(result) => {
            tracing::debug!(tool = %result.tool, success = result.success, "direct tool call");
            Json(result).into_response()
        }
        None => http_json::error(StatusCode::NOT_FOUND, format!("unknown tool: {name}")),
    }
}
