use std::time::Duration;

use crate::infra::config::ToolConfig;

const DEFAULT_TIMEOUT_MS: u64 = 8_000;

/// Build a reqwest client with sane defaults (connect + overall timeouts).
pub fn make_http_client() -> reqwest::Client {
    build_client(DEFAULT_TIMEOUT_MS)
}

/// Same as `make_http_client`, honoring a tool's `timeout_ms`.
pub fn make_http_client_with(cfg: &ToolConfig) -> reqwest::Client {
    build_client(cfg.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
}

pub fn make_http_client_timeout(timeout: Duration) -> reqwest::Client {
    build_client(timeout.as_millis() as u64)
}

fn build_client(timeout_ms: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2).min(Duration::from_millis(timeout_ms)))
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default reqwest client");
            reqwest::Client::new()
        })
}

/// Outcome of one attempt inside `retry_async`.
#[derive(Debug)]
pub enum Attempt<E> {
    Retry(E),
    Fatal(E),
}

/// Exponential backoff for async ops. `Fatal` errors stop immediately.
pub async fn retry_async<T, E, Fut, F>(mut attempts: u32, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, Attempt<E>>>,
{
    let mut try_num: u32 = 0;
    let mut delay_ms: u64 = 50;
    loop {
        match op(try_num).await {
            Ok(v) => return Ok(v),
            Err(Attempt::Fatal(e)) => return Err(e),
            Err(Attempt::Retry(e)) => {
                if attempts == 0 {
                    return Err(e);
                }
                attempts -= 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms * 2).min(1_000);
                try_num += 1;
            }
        }
    }
}

/// Classify a non-success status: 5xx and 429 are worth retrying.
pub fn status_attempt(status: reqwest::StatusCode) -> Attempt<String> {
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Attempt::Retry(format!("retryable status {status}"))
    } else {
        Attempt::Fatal(format!("upstream status {status}"))
    }
}
