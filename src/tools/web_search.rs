use async_trait::async_trait;

use super::{names, normalize_search_input};
use crate::clients::duckduckgo::DuckDuckGoRemote;
use crate::clients::truncate_chars;
use crate::core::tool::{Tool, ToolSpec};
use crate::domain::ToolError;

const BODY_CHARS: usize = 200;

#[derive(Clone)]
pub struct WebSearchTool {
    client: DuckDuckGoRemote,
}

impl WebSearchTool {
    pub fn new(client: DuckDuckGoRemote) -> Self {
        Self { client }
    }
}

impl ToolSpec for WebSearchTool {
    fn name(&self) -> &'static str {
        names::WEB_SEARCH
    }
    fn description(&self) -> &'static str {
        "Search the web for current information. Input: search query. who, what, when, where, why, how."
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let query = normalize_search_input(input)?;
        let hits = self
            .client
            .search(&query)
            .await
            .map_err(|e| ToolError::Upstream(format!("DuckDuckGo search failed: {e}")))?;
        if hits.is_empty() {
            return Ok("No results found on DuckDuckGo.".into());
        }
        let formatted: Vec<String> = hits
            .iter()
            .map(|h| {
                let body = if h.body.is_empty() {
                    String::new()
                } else {
                    format!("{}...", truncate_chars(&h.body, BODY_CHARS))
                };
                let link = h.link.as_deref().unwrap_or("No link available");
                format!("- {}\n  {body}\n  Source: {link}", h.title)
            })
            .collect();
        Ok(formatted.join("\n\n"))
    }
}
