use std::collections::HashMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::get_json;
use crate::infra::config::ToolConfig;
use crate::infra::runtime::limits::{make_http_client, make_http_client_with};

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov";

#[derive(Clone)]
pub struct PubMedRemote {
    base: String,
    http: Client,
    retries: u32,
    max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub pmid: String,
    pub title: String,
    pub journal: Option<String>,
    pub published: Option<String>,
    pub authors: Vec<String>,
}

impl Article {
    pub fn link(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.pmid)
    }
}

impl PubMedRemote {
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

    fn url(&self, endpoint: &str) -> String {
        format!("{}/entrez/eutils/{endpoint}", self.base.trim_end_matches('/'))
    }

    pub async fn search_ids(&self, term: &str) -> Result<Vec<String>, String> {
        let params = [
            ("db", "pubmed".to_string()),
            ("term", term.to_string()),
            ("retmax", self.max_results.to_string()),
            ("retmode", "json".to_string()),
        ];
        let wire: ESearchWire =
            get_json(&self.http, &self.url("esearch.fcgi"), &params, self.retries, "pubmed.esearch").await?;
        Ok(wire.esearchresult.idlist)
    }

    pub async fn summaries(&self, ids: &[String]) -> Result<Vec<Article>, String> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = [
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "json".to_string()),
        ];
        let wire: ESummaryWire =
            get_json(&self.http, &self.url("esummary.fcgi"), &params, self.retries, "pubmed.esummary").await?;
        // Keep esearch relevance order; drop ids the summary omitted.
        Ok(ids
            .iter()
            .filter_map(|id| {
                let doc: DocSumWire = serde_json::from_value(wire.result.get(id)?.clone()).ok()?;
                Some(Article {
                    pmid: id.clone(),
                    title: doc.title.unwrap_or_else(|| "No title available".into()),
                    journal: doc.fulljournalname.or(doc.source).filter(|s| !s.is_empty()),
                    published: doc.pubdate.filter(|s| !s.is_empty()),
                    authors: doc.authors.into_iter().map(|a| a.name).collect(),
                })
            })
            .collect())
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Article>, String> {
        let ids = self.search_ids(term).await?;
        self.summaries(&ids).await
    }
}

#[derive(Deserialize)]
struct ESearchWire {
    #[serde(default)]
    esearchresult: ESearchResultWire,
}

#[derive(Deserialize, Default)]
struct ESearchResultWire {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Deserialize)]
struct ESummaryWire {
    #[serde(default)]
    result: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct DocSumWire {
    title: Option<String>,
    fulljournalname: Option<String>,
    source: Option<String>,
    pubdate: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorWire>,
}

#[derive(Deserialize)]
struct AuthorWire {
    name: String,
}
