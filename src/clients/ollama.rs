use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::model::{LanguageModel, ModelError};
use crate::infra::config::ModelConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client_timeout;

/// Client for a local Ollama runtime (`/api/generate`).
#[derive(Clone)]
pub struct OllamaClient {
    base: String,
    model: String,
    temperature: f32,
    stop: Vec<String>,
    http: Client,
}

impl OllamaClient {
    pub fn new(base: impl Into<String>, model: impl Into<String>) -> Self {
        Self::from_config(&ModelConfig {
            base_url: base.into(),
            model: model.into(),
            ..ModelConfig::default()
        })
    }

    pub fn from_config(cfg: &ModelConfig) -> Self {
        Self {
            base: cfg.base_url.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            stop: Vec::new(),
            http: make_http_client_timeout(Duration::from_millis(cfg.timeout_ms)),
        }
    }

    /// Stop sequences passed through to the runtime.
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = self.url("/api/generate");
        let body = GenerateReq {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                stop: &self.stop,
            },
        };
        tracing::debug!(endpoint = %url, model = %self.model, prompt_chars = prompt.len(), "ollama.generate request");
        let start = Instant::now();
        let (builder, _rid) = add_standard_headers(self.http.post(url), None);
        let resp = builder.json(&body).send().await.map_err(|e| {
            crate::infra::logging::log_metric("ollama.generate", "remote_error_total", 1.0);
            ModelError::Unavailable(e.to_string())
        })?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            crate::infra::logging::log_metric("ollama.generate", "remote_error_total", 1.0);
            return Err(ModelError::Upstream(status.as_u16(), text));
        }
        let wire: GenerateResp = resp
            .json()
            .await
            .map_err(|e| ModelError::Malformed(e.to_string()))?;
        if let Some(err) = wire.error {
            return Err(ModelError::Upstream(status.as_u16(), err));
        }
        let text = wire.response.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ModelError::Malformed("empty response".into()));
        }
        let elapsed_ms = start.elapsed().as_millis() as f64;
        crate::infra::logging::log_metric("ollama.generate", "remote_latency_ms", elapsed_ms);
        Ok(text)
    }

    async fn health(&self) -> bool {
        let (builder, _rid) = add_standard_headers(self.http.get(self.url("/api/tags")), None);
        match builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[derive(Serialize)]
struct GenerateReq<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Serialize)]
struct GenerateOptions<'a> {
    temperature: f32,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Deserialize)]
struct GenerateResp {
    response: Option<String>,
    error: Option<String>,
}
