use async_trait::async_trait;

use super::{names, normalize_search_input};
use crate::clients::pubmed::PubMedRemote;
use crate::core::tool::{Tool, ToolSpec};
use crate::domain::ToolError;

#[derive(Clone)]
pub struct PubMedTool {
    client: PubMedRemote,
}

impl PubMedTool {
    pub fn new(client: PubMedRemote) -> Self {
        Self { client }
    }
}

impl ToolSpec for PubMedTool {
    fn name(&self) -> &'static str {
        names::PUBMED
    }
    fn description(&self) -> &'static str {
        "Searches PubMed for medical research. research paper on medical topic or keywords."
    }
}

#[async_trait]
impl Tool for PubMedTool {
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let term = normalize_search_input(input)?;
        let articles = self
            .client
            .search(&term)
            .await
            .map_err(|e| ToolError::Upstream(format!("Error searching PubMed: {e}")))?;
        if articles.is_empty() {
            return Ok("No results found on PubMed.".into());
        }
        let formatted: Vec<String> = articles
            .iter()
            .map(|a| {
                let mut lines = vec![format!("Title: {}", a.title), format!("PubMed ID: {}", a.pmid)];
                if let Some(j) = &a.journal {
                    lines.push(format!("Journal: {j}"));
                }
                if let Some(p) = &a.published {
                    lines.push(format!("Published: {p}"));
                }
                lines.push(format!("Link: {}", a.link()));
                lines.join("\n")
            })
            .collect();
        Ok(formatted.join("\n\n"))
    }
}
