pub mod arxiv;
pub mod duckduckgo;
pub mod ollama;
pub mod pubmed;
pub mod wikipedia;

use std::time::Instant;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::infra::http::headers::{add_standard_headers, generate_request_id};
use crate::infra::runtime::limits::{retry_async, status_attempt, Attempt};

/// GET `url` with query params, retrying transport errors and 5xx. Logs latency/error metrics under `metric_tool`.
pub(crate) async fn get_text(
    http: &Client,
    url: &str,
    params: &[(&str, String)],
    retries: u32,
    metric_tool: &str,
) -> Result<String, String> {
    tracing::debug!(endpoint = %url, tool = metric_tool, "remote request");
    let req_id = generate_request_id();
    let start = Instant::now();
    let res: Result<String, String> = retry_async(retries, |_| {
        let (builder, _rid) = add_standard_headers(http.get(url).query(params), Some(req_id.clone()));
        async move {
            let resp = builder
                .send()
                .await
                .map_err(|e| Attempt::Retry(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(status_attempt(resp.status()));
            }
            resp.text().await.map_err(|e| Attempt::Retry(e.to_string()))
        }
    })
    .await;
    match &res {
        Ok(_) => {
            let elapsed_ms = start.elapsed().as_millis() as f64;
            crate::infra::logging::log_metric(metric_tool, "remote_latency_ms", elapsed_ms);
        }
        Err(e) => {
            tracing::debug!(tool = metric_tool, error = %e, "remote request failed");
            crate::infra::logging::log_metric(metric_tool, "remote_error_total", 1.0);
        }
    }
    res
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    params: &[(&str, String)],
    retries: u32,
    metric_tool: &str,
) -> Result<T, String> {
    let body = get_text(http, url, params, retries, metric_tool).await?;
    serde_json::from_str(&body).map_err(|e| format!("invalid response body: {e}"))
}

/// Cut `s` to at most `max` chars, on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub(crate) fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the XML entities that show up in Atom feed text.
pub(crate) fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn squashes_and_decodes() {
        assert_eq!(squash_whitespace("  a \n\t b "), "a b");
        assert_eq!(decode_entities("R&amp;D &lt;3"), "R&D <3");
    }

    #[tokio::test]
    async fn get_text_retries_server_errors() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        });
        let http = reqwest::Client::new();
        let err = get_text(&http, &server.url("/flaky"), &[], 2, "test")
            .await
            .unwrap_err();
        assert!(err.contains("retryable status"));
        failing.assert_hits(3);
    }

    #[tokio::test]
    async fn get_text_does_not_retry_client_errors() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        let http = reqwest::Client::new();
        let err = get_text(&http, &server.url("/missing"), &[], 2, "test")
            .await
            .unwrap_err();
        assert!(err.contains("upstream status"));
        m.assert_hits(1);
    }

    #[tokio::test]
    async fn get_text_sends_request_id_and_user_agent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/ok")
                .query_param("q", "a b")
                .header_exists("x-request-id")
                .header_exists("user-agent");
            then.status(200).body("fine");
        });
        let http = reqwest::Client::new();
        let body = get_text(&http, &server.url("/ok"), &[("q", "a b".into())], 0, "test")
            .await
            .unwrap();
        assert_eq!(body, "fine");
        m.assert();
    }
}
