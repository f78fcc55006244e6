//! Pipeline statistics and processing summaries.

use serde::{Deserialize, Serialize};

/// Response of `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub needs_review: u64,
}

/// Response of `POST /process-listings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub exact_matches: u64,
    #[serde(default)]
    pub fuzzy_matches: u64,
    #[serde(default)]
    pub unmatched: u64,
    #[serde(default)]
    pub llm_matches: u64,
}

impl std::fmt::Display for ProcessSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed: {}, Exact: {}, Fuzzy: {}, Unmatched: {}, LLM: {}",
            self.processed, self.exact_matches, self.fuzzy_matches, self.unmatched, self.llm_matches
        )
    }
}
