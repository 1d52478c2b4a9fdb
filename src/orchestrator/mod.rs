//! Turns a query into an [`Answer`]: pick tools, run them, prompt the model.

pub mod prompt;
pub mod react;
pub mod selection;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;

use crate::core::error::AssistantError;
use crate::core::model::LanguageModel;
use crate::core::tool::invoke;
use crate::domain::{Answer, Query, Strategy, ToolResult};
use crate::infra::config::OrchestratorConfig;
use crate::infra::logging::log_metric;
use crate::tools::registry::ToolRegistry;

use selection::Plan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub strategy: Strategy,
    pub tool_timeout: Duration,
    pub max_iterations: usize,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self::from(&OrchestratorConfig::default())
    }
}

impl From<&OrchestratorConfig> for OrchestratorOptions {
    fn from(cfg: &OrchestratorConfig) -> Self {
        Self {
            strategy: cfg.strategy,
            tool_timeout: Duration::from_millis(cfg.tool_timeout_ms),
            max_iterations: cfg.max_iterations.max(1),
        }
    }
}

pub struct Orchestrator {
    model: Arc<dyn LanguageModel>,
    registry: ToolRegistry,
    opts: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn LanguageModel>, registry: ToolRegistry, opts: OrchestratorOptions) -> Self {
        Self { model, registry, opts }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn strategy(&self) -> Strategy {
        self.opts.strategy
    }

    pub async fn model_ready(&self) -> bool {
        self.model.health().await
    }

    /// Answer one query. Tool failures are absorbed; model failures surface as errors.
    #[tracing::instrument(skip_all, fields(strategy = %self.opts.strategy))]
    pub async fn answer(&self, query: &Query) -> Result<Answer, AssistantError> {
        let start = Instant::now();
        let (text, tools) = match self.opts.strategy {
            Strategy::Heuristic => self.answer_heuristic(query.as_str()).await?,
            Strategy::React => {
                react::run(
                    self.model.as_ref(),
                    &self.registry,
                    query.as_str(),
                    self.opts.max_iterations,
                    self.opts.tool_timeout,
                )
                .await?
            }
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(tools = tools.len(), elapsed_ms, "answer ready");
        log_metric("orchestrator", "answer_latency_ms", elapsed_ms as f64);
        Ok(Answer {
            text,
            tools,
            strategy: self.opts.strategy,
            model: self.model.name().to_string(),
            generated_at: Utc::now(),
        })
    }

    async fn answer_heuristic(&self, question: &str) -> Result<(String, Vec<ToolResult>), AssistantError> {
        let plans = selection::select(question, &self.registry);
        tracing::debug!(plans = ?plans, "tools selected");
        let results = self.run_plans(&plans).await;
        let prompt = prompt::augmented(question, &results);
        if !results.is_empty() && results.iter().all(|r| !r.success) {
            tracing::warn!("all selected tools failed, prompting without context");
        }
        let text = self.model.generate(&prompt).await?;
        Ok((text.trim().to_string(), results))
    }

    /// Run all plans concurrently. Results come back in plan order.
    async fn run_plans(&self, plans: &[Plan]) -> Vec<ToolResult> {
        let timeout = self.opts.tool_timeout;
        let calls = plans.iter().filter_map(|plan| {
            let tool = self.registry.get(plan.tool)?;
            Some(async move { invoke(tool.as_ref(), &plan.input, timeout).await })
        });
        join_all(calls).await
    }

    /// Run a single named tool under the same deadline. `None` when no such tool is registered.
    pub async fn invoke_tool(&self, name: &str, input: &str) -> Option<ToolResult> {
        let tool = self.registry.get(name)?;
        Some(invoke(tool.as_ref(), input, self.opts.tool_timeout).await)
    }
}
