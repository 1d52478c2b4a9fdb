use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("model runtime unreachable: {0}")]
    Unavailable(String),
    #[error("model runtime returned status {0}: {1}")]
    Upstream(u16, String),
    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// Text generation backend. Implemented by the Ollama client and by test fakes.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
    async fn health(&self) -> bool {
        true
    }
}
