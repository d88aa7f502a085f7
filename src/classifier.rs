//! Query Classifier
//!
//! Decides whether a query goes to the research agent or gets a plain
//! conversational answer:
//! - Research: "explain the causes of the 2008 crash", "compare Rust and Go"
//! - Conversational: "hello, how are you", "tell me a joke"

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Research,
    Conversational,
}

/// Canonical keyword list, matched as lowercase substrings.
pub const RESEARCH_KEYWORDS: &[&str] = &[
    "research", "analyze", "explain", "compare",
    "impact", "history", "statistics", "data",
    "sources", "study", "causes", "effects",
];

pub struct QueryClassifier;

impl QueryClassifier {
    /// Total and deterministic: any keyword hit means research.
    pub fn classify(query: &str) -> QueryKind {
        let lowered = query.to_lowercase();

        if RESEARCH_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            QueryKind::Research
        } else {
            QueryKind::Conversational
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_queries() {
        let cases = vec![
            "research the history of the Eiffel Tower",
            "Explain photosynthesis",
            "COMPARE tabs and spaces",
            "what are the effects of caffeine?",
            "give me statistics on rainfall",
        ];

        for c in cases {
            assert_eq!(QueryClassifier::classify(c), QueryKind::Research, "{}", c);
        }
    }

    #[test]
    fn test_conversational_queries() {
        let cases = vec![
            "hello, how are you",
            "tell me a joke",
            "what's your name?",
            "",
        ];

        for c in cases {
            assert_eq!(
                QueryClassifier::classify(c),
                QueryKind::Conversational,
                "{}",
                c
            );
        }
    }

    #[test]
    fn test_substring_matching() {
        // "data" inside "database", "study" inside "studying"
        assert_eq!(
            QueryClassifier::classify("which database should I use"),
            QueryKind::Research
        );
        assert_eq!(
            QueryClassifier::classify("I am studying tonight"),
            QueryKind::Research
        );
    }

    #[test]
    fn test_every_keyword_matches_in_any_case() {
        for kw in RESEARCH_KEYWORDS {
            let upper = format!("please {} this", kw.to_uppercase());
            assert_eq!(QueryClassifier::classify(&upper), QueryKind::Research);
        }
    }
}
