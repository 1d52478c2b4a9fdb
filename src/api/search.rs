use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::Instrument;

use super::AppState;
use crate::core::error::AssistantError;
use crate::domain::Query;
use crate::infra::http::headers::generate_request_id;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// `POST /search`: answer one query.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Response, AssistantError> {
    let request_id = generate_request_id();
    let span = tracing::info_span!("search", request_id = %request_id);
    async move {
        let query = Query::parse(req.query.as_deref().unwrap_or_default())?;
        tracing::info!(chars = query.as_str().chars().count(), "search received");
        let answer = state.orchestrator.answer(&query).await?;
        Ok::<_, AssistantError>(([("x-request-id", request_id.clone())], Json(answer)).into_response())
    }
    .instrument(span)
    .await
}

/// `GET /`: a bare page that posts to `/search`.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let items: String = state
        .orchestrator
        .registry()
        .list()
        .iter()
        .map(|t| format!("<li><b>{}</b>: {}</li>", escape(t.name), escape(t.description)))
        .collect();
    Html(INDEX_HTML.replace("{{tools}}", &items))
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready when the model runtime answers.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.orchestrator.model_ready().await {
        (StatusCode::OK, "ready")
    } else {
        tracing::warn!(model = state.orchestrator.model_name(), "model runtime not ready");
        (StatusCode::SERVICE_UNAVAILABLE, "model unavailable")
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Research Assistant</title></head>
<body>
<h1>Research Assistant</h1>
<form id="f"><input id="q" size="80" placeholder="Ask a question"> <button>Search</button></form>
<pre id="out"></pre>
<h2>Tools</h2>
<ul>{{tools}}</ul>
<script>
document.getElementById('f').addEventListener('submit', async (e) => {
  e.preventDefault();
  const out = document.getElementById('out');
  out.textContent = 'Searching...';
  const resp = await fetch('/search', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ query: document.getElementById('q').value })
  });
  const data = await resp.json();
  out.textContent = data.result ?? ('Error: ' + data.error);
});
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
