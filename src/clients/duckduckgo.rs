use reqwest::Client;
use serde::Serialize;

use scraper::{Html, Selector};

use super::{get_text, squash_whitespace};
use crate::infra::config::ToolConfig;
use crate::infra::runtime::limits::{make_http_client, make_http_client_with};

pub const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

#[derive(Clone)]
pub struct DuckDuckGoRemote {
    base: String,
    http: Client,
    retries: u32,
    max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebHit {
    pub title: String,
    pub body: String,
    pub link: Option<String>,
}

impl DuckDuckGoRemote {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(),
            retries: 1,
            max_results: 3,
        }
    }

    pub fn from_config(cfg: &ToolConfig) -> Self {
        Self {
            base: cfg.base_url_or(DEFAULT_BASE_URL),
            http: make_http_client_with(cfg),
            retries: cfg.retries.unwrap_or(1),
            max_results: cfg.max_results.unwrap_or(3).max(1),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<WebHit>, String> {
        let url = format!("{}/html/", self.base.trim_end_matches('/'));
        let html = get_text(&self.http, &url, &[("q", query.to_string())], self.retries, "duckduckgo.search").await?;
        parse_results(&html, self.max_results)
    }
}

/// Pull result blocks out of the HTML endpoint's markup.
pub fn parse_results(html: &str, max: usize) -> Result<Vec<WebHit>, String> {
    let block = selector(".result__body")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let url_sel = selector("a.result__url")?;

    let document = Html::parse_document(html);
    let hits = document
        .select(&block)
        .filter_map(|result| {
            let anchor = result.select(&title_sel).next()?;
            let title = squash_whitespace(&anchor.text().collect::<String>());
            if title.is_empty() {
                return None;
            }
            let body = result
                .select(&snippet_sel)
                .next()
                .map(|el| squash_whitespace(&el.text().collect::<String>()))
                .unwrap_or_default();
            let link = anchor
                .value()
                .attr("href")
                .map(resolve_redirect)
                .or_else(|| {
                    result
                        .select(&url_sel)
                        .next()
                        .map(|el| squash_whitespace(&el.text().collect::<String>()))
                });
            Some(WebHit { title, body, link })
        })
        .take(max)
        .collect();
    Ok(hits)
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("bad selector {css}: {e}"))
}

/// DDG wraps outbound links as `//duckduckgo.com/l/?uddg=<encoded>&rut=..`.
fn resolve_redirect(href: &str) -> String {
    if let Some(idx) = href.find("uddg=") {
        let encoded = &href[idx + "uddg=".len()..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    href.to_string()
}
