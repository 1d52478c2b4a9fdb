use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::{ToolError, ToolResult};

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

/// Tool = Spec + a single text-in, text-out call.
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    async fn call(&self, input: &str) -> Result<String, ToolError>;
}

/// Run a tool under a deadline. Errors and timeouts become a failed `ToolResult`.
pub async fn invoke(tool: &dyn Tool, input: &str, timeout: Duration) -> ToolResult {
    let start = Instant::now();
    let outcome = match tokio::time::timeout(timeout, tool.call(input)).await {
        Ok(res) => res,
        Err(_) => Err(ToolError::Timeout(timeout.as_millis() as u64)),
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(payload) => {
            tracing::debug!(tool = tool.name(), elapsed_ms, "tool succeeded");
            ToolResult::ok(tool.name(), input, payload).with_latency(elapsed_ms)
        }
        Err(e) => {
            tracing::warn!(tool = tool.name(), error = %e, elapsed_ms, "tool failed");
            crate::infra::logging::log_metric(tool.name(), "tool_error_total", 1.0);
            ToolResult::failed(tool.name(), input, &e).with_latency(elapsed_ms)
        }
    }
}
