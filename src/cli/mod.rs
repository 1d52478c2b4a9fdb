use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::domain::Query;
use crate::infra::config::{AppConfig, Config};

#[derive(Parser)]
#[command(name = "research-assistant")]
#[command(about = "Research assistant: local LLM answers grounded in Wikipedia, web, arXiv and PubMed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Answer one question and print the result
    Ask {
        /// The question
        query: Vec<String>,
        /// Print the full answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one tool directly
    Tool {
        /// Tool name, e.g. Wikipedia or BasicMath
        name: String,
        /// Tool input
        input: Vec<String>,
    },
    /// Health check a running service
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => match crate::infra::boot::run_server().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server exited");
                eprintln!("❌ Server failed: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Ask { query, json } => match ask(&query.join(" "), json).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Tool { name, input } => match run_tool(&name, &input.join(" ")).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("❌ {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn load_app_config() -> anyhow::Result<AppConfig> {
    let app = AppConfig::from_env_and_toml().map_err(anyhow::Error::msg)?;
    app.validate().map_err(anyhow::Error::msg)?;
    Ok(app)
}

async fn ask(raw: &str, as_json: bool) -> anyhow::Result<()> {
    let query = Query::parse(raw)?;
    let orchestrator = crate::infra::boot::build_orchestrator(&load_app_config()?);
    let answer = orchestrator.answer(&query).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }
    println!("{}", answer.text);
    if !answer.tools.is_empty() {
        println!();
        for t in &answer.tools {
            let mark = if t.success { "✅" } else { "❌" };
            println!("{mark} {} ({} ms) input: {}", t.tool, t.latency_ms, t.input);
        }
    }
    Ok(())
}

/// Returns whether the tool succeeded.
async fn run_tool(name: &str, input: &str) -> anyhow::Result<bool> {
    let orchestrator = crate::infra::boot::build_orchestrator(&load_app_config()?);
    let Some(result) = orchestrator.invoke_tool(name, input).await else {
        anyhow::bail!(
            "unknown tool '{name}', try one of [{}]",
            orchestrator.registry().names().join(", ")
        );
    };
    match (&result.payload, &result.error) {
        (Some(p), _) => println!("{p}"),
        (None, Some(e)) => eprintln!("❌ {}: {e}", result.tool),
        _ => {}
    }
    Ok(result.success)
}

async fn health_check(url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url.trim_end_matches('/')))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        anyhow::bail!("HTTP {}", response.status())
    }
}

fn validate_config() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    if cfg.mode != "server" {
        anyhow::bail!("Invalid MODE: {}. Must be 'server'", cfg.mode);
    }
    if cfg.port == 0 {
        anyhow::bail!("PORT cannot be 0");
    }
    load_app_config()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[tokio::test]
    async fn health_check_ok_and_error_paths() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200).body("ok");
        });
        assert!(health_check(&server.base_url()).await.is_ok());

        let bad = MockServer::start();
        bad.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(500);
        });
        assert!(health_check(&bad.base_url()).await.is_err());
    }

    #[tokio::test]
    async fn health_check_fails_when_nothing_listens() {
        assert!(health_check("http://127.0.0.1:9").await.is_err());
    }

    #[test]
    #[serial]
    fn validate_config_accepts_defaults() {
        env::remove_var("MODE");
        env::remove_var("PORT");
        env::remove_var("RESEARCH_ASSISTANT_CONFIG");
        assert!(validate_config().is_ok());
    }

    #[test]
    #[serial]
    fn validate_config_rejects_unknown_mode() {
        env::set_var("MODE", "stdio");
        let err = validate_config().unwrap_err();
        assert!(err.to_string().contains("Invalid MODE"));
        env::remove_var("MODE");
    }

    #[test]
    #[serial]
    fn validate_config_rejects_port_zero() {
        env::set_var("PORT", "0");
        let err = validate_config().unwrap_err();
        assert!(err.to_string().contains("PORT cannot be 0"));
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn validate_config_rejects_bad_model_url() {
        env::set_var("OLLAMA_BASE_URL", "localhost:11434");
        assert!(validate_config().is_err());
        env::remove_var("OLLAMA_BASE_URL");
    }

    #[tokio::test]
    #[serial]
    async fn tool_command_runs_math_locally() {
        env::remove_var("RESEARCH_ASSISTANT_CONFIG");
        let ok = run_commands(Commands::Tool { name: "basicmath".into(), input: vec!["6".into(), "*".into(), "7".into()] }).await;
        assert_eq!(ok, ExitCode::SUCCESS);
        let bad = run_commands(Commands::Tool { name: "BasicMath".into(), input: vec!["import os".into()] }).await;
        assert_eq!(bad, ExitCode::FAILURE);
        let unknown = run_commands(Commands::Tool { name: "Google".into(), input: vec!["x".into()] }).await;
        assert_eq!(unknown, ExitCode::FAILURE);
    }

    #[tokio::test]
    #[serial]
    async fn ask_rejects_blank_queries() {
        let code = run_commands(Commands::Ask { query: vec!["  ".into()], json: false }).await;
        assert_eq!(code, ExitCode::FAILURE);
    }
}
