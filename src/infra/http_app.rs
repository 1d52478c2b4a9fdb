use axum::{
    routing::{get, post},
    Router,
};

use crate::api::{search, tools, AppState};

/// Full HTTP surface: the search page and endpoint, direct tool calls, probes.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(search::index))
        .route("/search", post(search::search))
        .route("/v1/tools", get(tools::list))
        .route("/v1/tools/:name", post(tools::call))
        .route("/healthz", get(search::healthz))
        .route("/readyz", get(search::readyz))
        .with_state(state)
}
