use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::AppState;
use crate::clients::ollama::OllamaClient;
use crate::domain::Strategy;
use crate::infra::config::{AppConfig, Config};
use crate::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::tools::registry::build_registry;

/// Wire model client, tools and options from config.
pub fn build_orchestrator(app: &AppConfig) -> Orchestrator {
    let mut model = OllamaClient::from_config(&app.model);
    if app.orchestrator.strategy == Strategy::React {
        // Keep the model from inventing its own observations.
        model = model.with_stop(vec!["\nObservation:".into()]);
    }
    Orchestrator::new(
        Arc::new(model),
        build_registry(app),
        OrchestratorOptions::from(&app.orchestrator),
    )
}

pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    let app = AppConfig::from_env_and_toml().map_err(anyhow::Error::msg)?;
    app.validate().map_err(anyhow::Error::msg)?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        model = %app.model.model,
        ollama = %app.model.base_url,
        strategy = %app.orchestrator.strategy,
        "BOOT research-assistant"
    );
    if cfg.mode != "server" {
        anyhow::bail!("unsupported MODE '{}' (only 'server')", cfg.mode);
    }

    let router = crate::infra::http_app::build_app(AppState::new(build_orchestrator(&app)));
    let addr: SocketAddr = (cfg.bind, cfg.port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn server_mode_is_the_default() {
        std::env::remove_var("MODE");
        let cfg = Config::from_env();
        assert_eq!(cfg.mode, "server");
    }

    #[test]
    fn orchestrator_reflects_config() {
        let mut app = AppConfig::default();
        app.orchestrator.strategy = Strategy::React;
        app.arxiv.enabled = false;
        let orch = build_orchestrator(&app);
        assert_eq!(orch.model_name(), "llama3.1");
        assert_eq!(orch.strategy(), Strategy::React);
        assert!(!orch.registry().contains("ArXiv"));
    }
}
