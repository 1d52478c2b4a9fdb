use reqwest::Client;
use serde::Serialize;

use super::{decode_entities, get_text, squash_whitespace};
use crate::infra::config::ToolConfig;
use crate::infra::runtime::limits::{make_http_client, make_http_client_with};

pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org";

#[derive(Clone)]
pub struct ArxivRemote {
    base: String,
    http: Client,
    retries: u32,
    max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preprint {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<String>,
}

impl ArxivRemote {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(),
            retries: 2,
            max_results: 3,
        }
    }

    pub fn from_config(cfg: &ToolConfig) -> Self {
        Self {
            base: cfg.base_url_or(DEFAULT_BASE_URL),
            http: make_http_client_with(cfg),
            retries: cfg.retries.unwrap_or(2),
            max_results: cfg.max_results.unwrap_or(3).max(1),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Preprint>, String> {
        let url = format!("{}/api/query", self.base.trim_end_matches('/'));
        let params = [
            ("search_query", format!("all:{query}")),
            ("start", "0".to_string()),
            ("max_results", self.max_results.to_string()),
        ];
        let feed = get_text(&self.http, &url, &params, self.retries, "arxiv.search").await?;
        if !feed.contains("<feed") {
            return Err("invalid response body: not an Atom feed".into());
        }
        Ok(parse_feed(&feed))
    }
}

/// Extract entries from an arXiv Atom feed.
pub fn parse_feed(feed: &str) -> Vec<Preprint> {
    feed.split("<entry>")
        .skip(1)
        .filter_map(|raw| {
            let entry = raw.split("</entry>").next().unwrap_or(raw);
            let title = element_text(entry, "title")?;
            let link = element_text(entry, "id")?;
            Some(Preprint {
                title,
                link,
                summary: element_text(entry, "summary").unwrap_or_default(),
                published: element_text(entry, "published"),
            })
        })
        .collect()
}

/// Text of the first `<tag ...>..</tag>` in `xml`, whitespace-collapsed.
fn element_text(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search_from = 0;
    while let Some(rel) = xml[search_from..].find(&open) {
        let at = search_from + rel;
        let after_name = &xml[at + open.len()..];
        // Guard against prefix matches such as <id> vs <idx>.
        if after_name.starts_with('>') || after_name.starts_with(' ') {
            let body_start = at + open.len() + after_name.find('>')? + 1;
            let body_end = body_start + xml[body_start..].find(&close)?;
            let text = squash_whitespace(&decode_entities(&xml[body_start..body_end]));
            return (!text.is_empty()).then_some(text);
        }
        search_from = at + open.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:transformers</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on complex
  recurrent or convolutional neural networks &amp; attention.</summary>
    <author><name>Ashish Vaswani</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/1810.04805v2</id>
    <title>BERT</title>
  </entry>
</feed>"#;

    #[test]
    fn it_parses_entries_not_feed_header() {
        let out = parse_feed(FEED);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "Attention Is All You Need");
        assert_eq!(out[0].link, "http://arxiv.org/abs/1706.03762v7");
        assert!(out[0].summary.starts_with("The dominant sequence"));
        assert!(out[0].summary.ends_with("& attention."));
        assert_eq!(out[0].published.as_deref(), Some("2017-06-12T17:57:34Z"));
        assert_eq!(out[1].summary, "");
    }

    #[tokio::test]
    async fn it_queries_with_all_prefix() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/api/query")
                .query_param("search_query", "all:transformers")
                .query_param("max_results", "3");
            then.status(200).body(FEED);
        });
        let cli = ArxivRemote::new(server.base_url());
        let out = cli.search("transformers").await.unwrap();
        m.assert();
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn it_rejects_non_feed_bodies() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/query");
            then.status(200).body("Rate exceeded.");
        });
        let cli = ArxivRemote::new(server.base_url());
        assert!(cli.search("x").await.is_err());
    }
}
