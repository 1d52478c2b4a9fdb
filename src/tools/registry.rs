use std::sync::Arc;

use serde::Serialize;

use crate::clients::arxiv::ArxivRemote;
use crate::clients::duckduckgo::DuckDuckGoRemote;
use crate::clients::pubmed::PubMedRemote;
use crate::clients::wikipedia::WikipediaRemote;
use crate::core::tool::Tool;
use crate::infra::config::AppConfig;
use crate::tools::arxiv::ArxivTool;
use crate::tools::math::MathTool;
use crate::tools::pubmed::PubMedTool;
use crate::tools::web_search::WebSearchTool;
use crate::tools::wikipedia::WikipediaTool;

/// Ordered set of tools. Order is registration order and is what prompts and listings show.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<Vec<Arc<dyn Tool>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMeta {
    pub name: &'static str,
    pub description: &'static str,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut reg = Self::new();
        for t in iter {
            reg.register(t);
        }
        reg
    }

    /// Add a tool, replacing any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let tools = Arc::make_mut(&mut self.tools);
        match tools.iter().position(|t| t.name() == tool.name()) {
            Some(i) => tools[i] = tool,
            None => tools.push(tool),
        }
    }

    /// Case-insensitive lookup; models are loose about capitalization.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let name = name.trim();
        self.tools
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn list(&self) -> Vec<ToolMeta> {
        self.tools
            .iter()
            .map(|t| ToolMeta {
                name: t.name(),
                description: t.description(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Build the registry from config, skipping disabled tools.
pub fn build_registry(cfg: &AppConfig) -> ToolRegistry {
    let mut reg = ToolRegistry::new();
    if cfg.wikipedia.enabled {
        reg.register(Arc::new(WikipediaTool::new(WikipediaRemote::from_config(&cfg.wikipedia))));
    }
    if cfg.duckduckgo.enabled {
        reg.register(Arc::new(WebSearchTool::new(DuckDuckGoRemote::from_config(&cfg.duckduckgo))));
    }
    if cfg.math.enabled {
        reg.register(Arc::new(MathTool));
    }
    if cfg.arxiv.enabled {
        reg.register(Arc::new(ArxivTool::new(ArxivRemote::from_config(&cfg.arxiv))));
    }
    if cfg.pubmed.enabled {
        reg.register(Arc::new(PubMedTool::new(PubMedRemote::from_config(&cfg.pubmed))));
    }
    tracing::info!(tools = ?reg.names(), "tool registry built");
    reg
}
