use async_trait::async_trait;

use super::{names, normalize_search_input};
use crate::clients::arxiv::ArxivRemote;
use crate::clients::truncate_chars;
use crate::core::tool::{Tool, ToolSpec};
use crate::domain::ToolError;

const SUMMARY_CHARS: usize = 200;

#[derive(Clone)]
pub struct ArxivTool {
    client: ArxivRemote,
}

impl ArxivTool {
    pub fn new(client: ArxivRemote) -> Self {
        Self { client }
    }
}

impl ToolSpec for ArxivTool {
    fn name(&self) -> &'static str {
        names::ARXIV
    }
    fn description(&self) -> &'static str {
        "Searches arXiv for scientific papers. research paper topic or keywords."
    }
}

#[async_trait]
impl Tool for ArxivTool {
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let query = normalize_search_input(input)?;
        let entries = self
            .client
            .search(&query)
            .await
            .map_err(|e| ToolError::Upstream(format!("Error searching ArXiv: {e}")))?;
        if entries.is_empty() {
            return Ok("No results found on arXiv.".into());
        }
        let formatted: Vec<String> = entries
            .iter()
            .map(|p| {
                format!(
                    "Title: {}\nLink: {}\nSummary: {}...",
                    p.title,
                    p.link,
                    truncate_chars(&p.summary, SUMMARY_CHARS)
                )
            })
            .collect();
        Ok(formatted.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn it_formats_entries_with_truncated_summary() {
        let long = "word ".repeat(100);
        let feed = format!(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><id>http://arxiv.org/abs/1</id><title>Paper One</title><summary>{long}</summary></entry></feed>"#
        );
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/query").query_param("search_query", "all:graph neural networks");
            then.status(200).body(feed);
        });
        let tool = ArxivTool::new(ArxivRemote::new(server.base_url()));
        let out = tool.call("graph neural networks").await.unwrap();
        assert!(out.starts_with("Title: Paper One\nLink: http://arxiv.org/abs/1\nSummary: word word"));
        assert!(out.ends_with("..."));
        // 200 chars of summary plus the fixed prefix/suffix
        let summary = out.split("Summary: ").nth(1).unwrap();
        assert_eq!(summary.trim_end_matches("...").chars().count(), 200);
    }

    #[tokio::test]
    async fn empty_feed_is_a_successful_no_results() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/query");
            then.status(200).body(r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#);
        });
        let tool = ArxivTool::new(ArxivRemote::new(server.base_url()));
        assert_eq!(tool.call("zz").await.unwrap(), "No results found on arXiv.");
    }
}
