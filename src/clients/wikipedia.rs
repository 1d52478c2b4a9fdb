use reqwest::Client;
use serde::Deserialize;

use super::{get_json, truncate_chars};
use crate::infra::config::ToolConfig;
use crate::infra::runtime::limits::{make_http_client, make_http_client_with};

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
const SUMMARY_CHARS: usize = 500;

#[derive(Clone)]
pub struct WikipediaRemote {
    base: String,
    http: Client,
    retries: u32,
    candidates: usize,
}

/// Outcome of a title search followed by a summary fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found { title: String, summary: String, url: Option<String> },
    NoResults,
    Ambiguous,
}

impl WikipediaRemote {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(),
            retries: 2,
            candidates: 3,
        }
    }

    pub fn from_config(cfg: &ToolConfig) -> Self {
        Self {
            base: cfg.base_url_or(DEFAULT_BASE_URL),
            http: make_http_client_with(cfg),
            retries: cfg.retries.unwrap_or(2),
            candidates: cfg.max_results.unwrap_or(3).max(1),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    pub async fn search_titles(&self, query: &str) -> Result<Vec<String>, String> {
        let params = [
            ("action", "query".to_string()),
            ("list", "search".to_string()),
            ("srsearch", query.to_string()),
            ("srlimit", self.candidates.to_string()),
            ("format", "json".to_string()),
        ];
        let wire: SearchWire =
            get_json(&self.http, &self.url("/w/api.php"), &params, self.retries, "wikipedia.search").await?;
        Ok(wire.query.search.into_iter().map(|h| h.title).collect())
    }

    pub async fn summary(&self, title: &str) -> Result<SummaryWire, String> {
        let slug = urlencoding::encode(&title.replace(' ', "_")).into_owned();
        let path = format!("/api/rest_v1/page/summary/{slug}");
        get_json(&self.http, &self.url(&path), &[], self.retries, "wikipedia.summary").await
    }

    /// Search, then summarize the first non-disambiguation hit.
    pub async fn lookup(&self, query: &str) -> Result<Lookup, String> {
        let titles = self.search_titles(query).await?;
        if titles.is_empty() {
            return Ok(Lookup::NoResults);
        }
        for title in titles {
            let page = self.summary(&title).await?;
            if page.kind == "disambiguation" {
                tracing::debug!(title = %title, "skipping disambiguation page");
                continue;
            }
            let extract = page.extract.unwrap_or_default();
            return Ok(Lookup::Found {
                title: page.title.unwrap_or(title),
                summary: truncate_chars(extract.trim(), SUMMARY_CHARS).to_string(),
                url: page
                    .content_urls
                    .and_then(|u| u.desktop)
                    .and_then(|d| d.page),
            });
        }
        Ok(Lookup::Ambiguous)
    }
}

#[derive(Deserialize)]
struct SearchWire {
    #[serde(default)]
    query: SearchQueryWire,
}

#[derive(Deserialize, Default)]
struct SearchQueryWire {
    #[serde(default)]
    search: Vec<SearchHitWire>,
}

#[derive(Deserialize)]
struct SearchHitWire {
    title: String,
}

#[derive(Deserialize, Debug)]
pub struct SummaryWire {
    #[serde(rename = "type", default)]
    kind: String,
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrlsWire>,
}

#[derive(Deserialize, Debug)]
struct ContentUrlsWire {
    desktop: Option<PageUrlWire>,
}

#[derive(Deserialize, Debug)]
struct PageUrlWire {
    page: Option<String>,
}
