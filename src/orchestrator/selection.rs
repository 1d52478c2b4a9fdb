//! Keyword/intent tool selection for the heuristic strategy.

use crate::tools::math::extract_expression;
use crate::tools::names;
use crate::tools::registry::ToolRegistry;

/// One planned tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub tool: &'static str,
    pub input: String,
}

impl Plan {
    fn new(tool: &'static str, input: impl Into<String>) -> Self {
        Self { tool, input: input.into() }
    }
}

const QUESTION: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "which", "history", "story", "define",
    "definition", "explain", "meaning", "biography", "describe", "tell",
];

const RECENCY: &[&str] = &[
    "latest", "news", "today", "tonight", "current", "currently", "recent", "recently", "now",
    "upcoming", "price", "prices", "weather", "score", "scores", "release", "released", "website",
    "web",
];

const RESEARCH: &[&str] = &[
    "paper", "papers", "research", "study", "studies", "literature", "publication",
    "publications", "journal", "journals", "article", "articles",
];

const PREPRINT: &[&str] = &[
    "arxiv", "preprint", "preprints", "physics", "quantum", "astrophysics", "cosmology",
    "mathematics", "theorem", "algorithm", "algorithms", "neural", "learning", "transformer",
    "transformers", "computation", "computer", "statistics", "cryptography", "robotics",
];

const MEDICAL: &[&str] = &[
    "pubmed", "medical", "medicine", "clinical", "disease", "diseases", "drug", "drugs", "gene",
    "genes", "genetic", "genome", "patient", "patients", "health", "treatment", "treatments",
    "therapy", "cancer", "tumor", "vaccine", "vaccines", "virus", "viral", "covid", "protein",
    "biomedical", "diabetes", "symptoms", "trial", "trials", "crispr", "antibiotic",
    "antibiotics", "infection",
];

const MATH_CUES: &[&str] = &[
    "calculate", "compute", "evaluate", "solve", "math", "sum", "plus", "minus", "times",
    "divided", "equals", "result",
];

/// Without a cue word, an expression must cover this share of the query to count as arithmetic.
const MATH_COVERAGE: f64 = 0.25;

/// Words stripped from the front of a question to get search terms.
const LEADING_FILLER: &[&str] = &[
    "what", "who", "whom", "whose", "when", "where", "why", "how", "which", "is", "are", "was",
    "were", "do", "does", "did", "can", "could", "would", "tell", "me", "about", "the", "a", "an",
    "please", "explain", "define", "describe", "find", "search", "for", "show", "give", "list",
    "some", "any", "i", "want", "to", "know", "look", "up",
];

/// Words dropped anywhere from literature searches.
const LITERATURE_FILLER: &[&str] = &[
    "paper", "papers", "research", "study", "studies", "literature", "publication",
    "publications", "article", "articles", "recent", "latest", "new", "on", "about", "arxiv",
    "pubmed", "preprint", "preprints", "find", "search", "show", "me", "some", "any", "the", "a",
    "an", "for", "of", "what", "are", "is", "there",
];

fn words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn any_of(words: &[String], set: &[&str]) -> bool {
    words.iter().any(|w| set.contains(&w.as_str()))
}

fn bare(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn strip_trailing_punct(s: &str) -> &str {
    s.trim().trim_end_matches(|c: char| matches!(c, '?' | '.' | '!' | ',' | ';' | ':')).trim()
}

/// Query minus a leading interrogative phrase and trailing punctuation.
/// `"What is the capital of France?"` → `"capital of France"`.
pub fn search_terms(query: &str) -> String {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    let first_kept = tokens
        .iter()
        .position(|t| !LEADING_FILLER.contains(&bare(t).as_str()))
        .unwrap_or(tokens.len());
    let kept = strip_trailing_punct(&tokens[first_kept..].join(" ")).to_string();
    if kept.is_empty() {
        strip_trailing_punct(query).to_string()
    } else {
        kept
    }
}

/// Topic words for arXiv/PubMed, with literature filler removed anywhere.
pub fn literature_terms(query: &str) -> String {
    let kept: Vec<&str> = query
        .split_whitespace()
        .filter(|t| {
            let b = bare(t);
            !b.is_empty() && !LITERATURE_FILLER.contains(&b.as_str())
        })
        .collect();
    let joined = strip_trailing_punct(&kept.join(" ")).to_string();
    if joined.is_empty() {
        search_terms(query)
    } else {
        joined
    }
}

/// Share of the query's non-whitespace characters covered by `part`.
fn coverage(part: &str, whole: &str) -> f64 {
    let count = |s: &str| s.chars().filter(|c| !c.is_whitespace()).count();
    let total = count(whole);
    if total == 0 {
        return 0.0;
    }
    count(part) as f64 / total as f64
}

/// Year spans and calendar dates: `1914-1918`, `2018-19`, `2024/01/15`, `15-01-2024`.
fn is_date_like(expr: &str) -> bool {
    let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    let sep = if compact.contains('-') { '-' } else { '/' };
    if compact.contains('-') && compact.contains('/') {
        return false;
    }
    let groups: Vec<&str> = compact.split(sep).collect();
    if groups.iter().any(|g| g.is_empty() || !g.chars().all(|c| c.is_ascii_digit())) {
        return false;
    }
    match groups.as_slice() {
        [from, to] if sep == '-' && from.len() == 4 => match to.len() {
            2 => true,
            4 => from < to,
            _ => false,
        },
        [a, b, c] => {
            fn short(g: &str) -> bool {
                (1..=2).contains(&g.len())
            }
            (a.len() == 4 && short(b) && short(c)) || (short(a) && short(b) && c.len() == 4)
        }
        _ => false,
    }
}

/// Choose tools for `query`. Plans come back in registry order and only name registered tools.
pub fn select(query: &str, registry: &ToolRegistry) -> Vec<Plan> {
    let w = words(query);
    let mut plans = Vec::new();

    let math_expr = extract_expression(query).filter(|expr| {
        any_of(&w, MATH_CUES)
            || query.contains('=')
            || (!is_date_like(expr) && coverage(expr, query) >= MATH_COVERAGE)
    });
    // Arithmetic only suppresses other tools when something can actually evaluate it.
    let has_math = math_expr.is_some() && registry.contains(names::MATH);
    if let Some(expr) = math_expr.filter(|_| has_math) {
        plans.push(Plan::new(names::MATH, expr));
    }

    let research = any_of(&w, RESEARCH);
    let preprint = any_of(&w, PREPRINT);
    let medical = any_of(&w, MEDICAL);
    let want_arxiv = preprint || (research && !medical);
    let want_pubmed = medical || (research && !preprint);
    // Bare medical keywords without a literature cue are encyclopedia questions.
    let literature = research || any_of(&w, &["arxiv", "preprint", "preprints", "pubmed"]);

    if literature && want_arxiv {
        plans.push(Plan::new(names::ARXIV, literature_terms(query)));
    }
    if literature && want_pubmed {
        plans.push(Plan::new(names::PUBMED, literature_terms(query)));
    }
    // "recent papers" is a literature request, not a news one.
    if any_of(&w, RECENCY) && !literature {
        plans.push(Plan::new(names::WEB_SEARCH, search_terms(query)));
    }
    if !has_math && !literature && any_of(&w, QUESTION) {
        plans.push(Plan::new(names::WIKIPEDIA, search_terms(query)));
    }

    plans.retain(|p| registry.contains(p.tool));

    if plans.is_empty() && !has_math {
        if let Some(fallback) = [names::WIKIPEDIA, names::WEB_SEARCH]
            .into_iter()
            .find(|t| registry.contains(t))
        {
            plans.push(Plan::new(fallback, search_terms(query)));
        }
    }

    let order = registry.names();
    plans.sort_by_key(|p| order.iter().position(|n| *n == p.tool).unwrap_or(usize::MAX));
    plans.dedup_by(|a, b| a.tool == b.tool);
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::AppConfig;
    use crate::tools::registry::build_registry;

    fn full() -> ToolRegistry {
        build_registry(&AppConfig::default())
    }

    fn tools(plans: &[Plan]) -> Vec<&'static str> {
        plans.iter().map(|p| p.tool).collect()
    }

    #[test]
    fn factual_question_goes_to_wikipedia() {
        let plans = select("What is the capital of France?", &full());
        assert_eq!(plans, vec![Plan::new(names::WIKIPEDIA, "capital of France")]);
    }

    #[test]
    fn arithmetic_goes_to_math_only() {
        let plans = select("What is 2+2?", &full());
        assert_eq!(plans, vec![Plan::new(names::MATH, "2+2")]);
        let plans = select("calculate (12.5 * 4) - 3", &full());
        assert_eq!(plans, vec![Plan::new(names::MATH, "(12.5 * 4) - 3")]);
    }

    #[test]
    fn year_ranges_in_prose_are_not_math() {
        let plans = select("Who won the 2018-2019 season of the league in Spain", &full());
        assert!(!tools(&plans).contains(&names::MATH));
    }

    #[test]
    fn dates_and_year_spans_go_to_wikipedia() {
        let cases = [
            ("History of the 1914-1918 war", "History of the 1914-1918 war"),
            ("Who won in 1990-1995?", "won in 1990-1995"),
            ("Tell me about 1939-1945", "1939-1945"),
            ("Events of 2024/01/15", "Events of 2024/01/15"),
        ];
        for (query, input) in cases {
            assert_eq!(select(query, &full()), vec![Plan::new(names::WIKIPEDIA, input)], "{query}");
        }
    }

    #[test]
    fn date_shapes_need_a_cue_word_to_count_as_math() {
        assert!(is_date_like("1914-1918"));
        assert!(is_date_like("2018-19"));
        assert!(is_date_like("2024/01/15"));
        assert!(is_date_like("15-01-2024"));
        assert!(!is_date_like("10-5-2"));
        assert!(!is_date_like("2000-1000"));
        assert!(!is_date_like("2024/12"));
        assert!(!is_date_like("2+2"));

        assert_eq!(select("calculate 6/2/3", &full()), vec![Plan::new(names::MATH, "6/2/3")]);
        assert_eq!(select("What is 10-5-2?", &full()), vec![Plan::new(names::MATH, "10-5-2")]);
    }

    #[test]
    fn arithmetic_without_basic_math_falls_back_to_lookup() {
        let mut cfg = AppConfig::default();
        cfg.math.enabled = false;
        let reg = build_registry(&cfg);
        assert_eq!(select("What is 2+2?", &reg), vec![Plan::new(names::WIKIPEDIA, "2+2")]);

        cfg.wikipedia.enabled = false;
        let reg = build_registry(&cfg);
        assert_eq!(select("7*6", &reg), vec![Plan::new(names::WEB_SEARCH, "7*6")]);
    }

    #[test]
    fn research_questions_go_to_literature_tools() {
        let plans = select("Find recent papers on quantum error correction", &full());
        assert_eq!(tools(&plans), vec![names::ARXIV]);
        assert_eq!(plans[0].input, "quantum error correction");

        let plans = select("Research papers about insulin resistance in patients", &full());
        assert_eq!(tools(&plans), vec![names::PUBMED]);

        let plans = select("research on sleep and memory", &full());
        assert_eq!(tools(&plans), vec![names::ARXIV, names::PUBMED]);
    }

    #[test]
    fn recency_adds_web_search() {
        let plans = select("What is the latest news about the Mars rover?", &full());
        assert_eq!(tools(&plans), vec![names::WIKIPEDIA, names::WEB_SEARCH]);
        assert_eq!(plans[1].input, "latest news about the Mars rover");
    }

    #[test]
    fn unmatched_queries_fall_back_to_wikipedia() {
        let plans = select("Ada Lovelace", &full());
        assert_eq!(plans, vec![Plan::new(names::WIKIPEDIA, "Ada Lovelace")]);
    }

    #[test]
    fn only_registered_tools_are_selected() {
        let mut cfg = AppConfig::default();
        cfg.wikipedia.enabled = false;
        let reg = build_registry(&cfg);
        let plans = select("Who was Alan Turing?", &reg);
        assert_eq!(plans, vec![Plan::new(names::WEB_SEARCH, "Alan Turing")]);

        let empty = ToolRegistry::new();
        assert!(select("Who was Alan Turing?", &empty).is_empty());
    }

    #[test]
    fn search_terms_strip_question_words() {
        assert_eq!(search_terms("Tell me about the history of Rome."), "history of Rome");
        assert_eq!(search_terms("Who is?"), "Who is");
        assert_eq!(literature_terms("arxiv papers"), "arxiv papers");
    }
}
