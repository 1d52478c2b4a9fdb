use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::AssistantError;

/// Longest query the handler accepts, in characters.
pub const MAX_QUERY_CHARS: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Upstream(String),
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// A validated, trimmed user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Self, AssistantError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AssistantError::Validation("No query provided".into()));
        }
        if trimmed.chars().count() > MAX_QUERY_CHARS {
            return Err(AssistantError::Validation(format!(
                "Query too long (max {MAX_QUERY_CHARS} characters)"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniform outcome of one adapter invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    pub input: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl ToolResult {
    pub fn ok(tool: impl Into<String>, input: impl Into<String>, payload: String) -> Self {
        Self {
            tool: tool.into(),
            input: input.into(),
            success: true,
            payload: Some(payload),
            error: None,
            latency_ms: 0,
        }
    }

    pub fn failed(tool: impl Into<String>, input: impl Into<String>, err: &ToolError) -> Self {
        Self {
            tool: tool.into(),
            input: input.into(),
            success: false,
            payload: None,
            error: Some(err.to_string()),
            latency_ms: 0,
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Text shown to the model: the payload, or the error prefixed by the tool name.
    pub fn observation(&self) -> String {
        match (&self.payload, &self.error) {
            (Some(p), _) => p.clone(),
            (None, Some(e)) => format!("Error from {}: {e}", self.tool),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Heuristic,
    React,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Strategy::Heuristic),
            "react" => Ok(Strategy::React),
            other => Err(format!("unknown strategy: {other} (expected 'heuristic' or 'react')")),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Heuristic => f.write_str("heuristic"),
            Strategy::React => f.write_str("react"),
        }
    }
}

/// Final composed response for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "result")]
    pub text: String,
    pub tools: Vec<ToolResult>,
    pub strategy: Strategy,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}
