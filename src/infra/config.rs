use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::Strategy;

pub struct Config {
    pub mode: String, // "server" only for now
    pub bind: [u8; 4],
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let mode = std::env::var("MODE").unwrap_or_else(|_| "server".into());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let bind = std::env::var("BIND")
            .ok()
            .and_then(|s| s.parse::<std::net::Ipv4Addr>().ok())
            .map(|ip| ip.octets())
            .unwrap_or([0, 0, 0, 0]);

        Self { mode, bind, port }
    }
}

/// Per-tool knobs. Every field is optional so a TOML section may be partial.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub retries: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub max_results: Option<usize>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            retries: None,
            timeout_ms: None,
            max_results: None,
        }
    }
}

impl ToolConfig {
    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "llama3.1".into(),
            temperature: 0.2,
            timeout_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub strategy: Strategy,
    pub tool_timeout_ms: u64,
    pub max_iterations: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Heuristic,
            tool_timeout_ms: 10_000,
            max_iterations: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub orchestrator: OrchestratorConfig,
    pub wikipedia: ToolConfig,
    pub duckduckgo: ToolConfig,
    pub pubmed: ToolConfig,
    pub arxiv: ToolConfig,
    pub math: ToolConfig,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("invalid config: {e}"))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    /// TOML file (if any) first, then environment overrides.
    pub fn from_env_and_toml() -> Result<Self, String> {
        let path = std::env::var("RESEARCH_ASSISTANT_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                let p = PathBuf::from("research-assistant.toml");
                p.exists().then_some(p)
            });
        let mut cfg = match path {
            Some(p) => {
                tracing::info!(path = %p.display(), "loading config file");
                Self::load(&p)?
            }
            None => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<(), String> {
        fn env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        }
        if let Some(v) = env("OLLAMA_BASE_URL") {
            self.model.base_url = v;
        }
        if let Some(v) = env("OLLAMA_MODEL") {
            self.model.model = v;
        }
        if let Some(v) = env("ORCHESTRATOR_STRATEGY") {
            self.orchestrator.strategy = v
                .parse()
                .map_err(|e| format!("invalid ORCHESTRATOR_STRATEGY: {e}"))?;
        }
        if let Some(v) = env("TOOL_TIMEOUT_MS") {
            self.orchestrator.tool_timeout_ms = v
                .trim()
                .parse()
                .map_err(|e| format!("invalid TOOL_TIMEOUT_MS {v:?}: {e}"))?;
        }
        for (key, tool) in [
            ("WIKIPEDIA_BASE_URL", &mut self.wikipedia),
            ("DUCKDUCKGO_BASE_URL", &mut self.duckduckgo),
            ("PUBMED_BASE_URL", &mut self.pubmed),
            ("ARXIV_BASE_URL", &mut self.arxiv),
        ] {
            if let Some(v) = env(key) {
                tool.base_url = Some(v);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if !is_http_url(&self.model.base_url) {
            return Err(format!("model.base_url must be http(s): {}", self.model.base_url));
        }
        if self.model.model.trim().is_empty() {
            return Err("model.model must not be empty".into());
        }
        if self.model.timeout_ms == 0 || self.orchestrator.tool_timeout_ms == 0 {
            return Err("timeouts must be greater than zero".into());
        }
        if self.orchestrator.max_iterations == 0 {
            return Err("orchestrator.max_iterations must be at least 1".into());
        }
        for (name, tool) in [
            ("wikipedia", &self.wikipedia),
            ("duckduckgo", &self.duckduckgo),
            ("pubmed", &self.pubmed),
            ("arxiv", &self.arxiv),
        ] {
            if let Some(url) = &tool.base_url {
                if !is_http_url(url) {
                    return Err(format!("{name}.base_url must be http(s): {url}"));
                }
            }
            if tool.timeout_ms == Some(0) {
                return Err(format!("{name}.timeout_ms must be greater than zero"));
            }
        }
        Ok(())
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
