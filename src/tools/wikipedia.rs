use async_trait::async_trait;

use super::{names, normalize_search_input};
use crate::clients::wikipedia::{Lookup, WikipediaRemote};
use crate::core::tool::{Tool, ToolSpec};
use crate::domain::ToolError;

#[derive(Clone)]
pub struct WikipediaTool {
    client: WikipediaRemote,
}

impl WikipediaTool {
    pub fn new(client: WikipediaRemote) -> Self {
        Self { client }
    }
}

impl ToolSpec for WikipediaTool {
    fn name(&self) -> &'static str {
        names::WIKIPEDIA
    }
    fn description(&self) -> &'static str {
        "Get detailed explanations and summaries from Wikipedia. who, what, when, where, why, how, story."
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let query = normalize_search_input(input)?;
        let found = self
            .client
            .lookup(&query)
            .await
            .map_err(|e| ToolError::Upstream(format!("Wikipedia search failed: {e}")))?;
        Ok(match found {
            Lookup::Found { title, summary, url } => match url {
                Some(url) => format!("{title}\n{summary}\nSource: {url}"),
                None => format!("{title}\n{summary}"),
            },
            Lookup::NoResults => format!("No Wikipedia articles found for '{query}'"),
            Lookup::Ambiguous => format!(
                "Multiple Wikipedia articles found for '{query}'. Please be more specific."
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn it_formats_summary_with_source() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/w/api.php").query_param("srsearch", "Rust language");
            then.status(200).json_body(json!({ "query": { "search": [ {"title": "Rust (programming language)"} ] } }));
        });
        server.mock(|when, then| {
            when.method(GET).path_contains("/api/rest_v1/page/summary/");
            then.status(200).json_body(json!({
                "type": "standard",
                "title": "Rust (programming language)",
                "extract": "Rust is a general-purpose programming language.",
                "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Rust_(programming_language)" } }
            }));
        });
        let tool = WikipediaTool::new(WikipediaRemote::new(server.base_url()));
        let out = tool.call("\"Rust+language\"").await.unwrap();
        assert!(out.starts_with("Rust (programming language)\nRust is a general-purpose"));
        assert!(out.ends_with("Source: https://en.wikipedia.org/wiki/Rust_(programming_language)"));
    }

    #[tokio::test]
    async fn it_reports_missing_articles_as_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/w/api.php");
            then.status(200).json_body(json!({ "query": { "search": [] } }));
        });
        let tool = WikipediaTool::new(WikipediaRemote::new(server.base_url()));
        let out = tool.call("qwzx").await.unwrap();
        assert_eq!(out, "No Wikipedia articles found for 'qwzx'");
    }

    #[tokio::test]
    async fn upstream_failure_is_tool_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/w/api.php");
            then.status(403);
        });
        let tool = WikipediaTool::new(WikipediaRemote::new(server.base_url()));
        let err = tool.call("Paris").await.unwrap_err();
        assert!(matches!(err, ToolError::Upstream(ref m) if m.contains("403")));
    }
}
