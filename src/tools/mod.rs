pub mod arxiv;
pub mod math;
pub mod pubmed;
pub mod registry;
pub mod web_search;
pub mod wikipedia;

use crate::domain::ToolError;

/// Tool identifiers, shared by the tools, the selection heuristic and prompts.
pub mod names {
    pub const WIKIPEDIA: &str = "Wikipedia";
    pub const WEB_SEARCH: &str = "DuckDuckGo";
    pub const MATH: &str = "BasicMath";
    pub const ARXIV: &str = "ArXiv";
    pub const PUBMED: &str = "PubMed";
}

/// Strip surrounding quotes, turn `+` into spaces, trim. Empty input is rejected.
pub(crate) fn normalize_search_input(input: &str) -> Result<String, ToolError> {
    let cleaned = input
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .replace('+', " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ToolError::InvalidInput("no query provided".into()));
    }
    Ok(cleaned.to_string())
}
