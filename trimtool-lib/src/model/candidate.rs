//! Fuzzy-match candidates for a listing's raw trim text.

use serde::{Deserialize, Serialize};

/// A scored, backend-suggested canonical trim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub trim: String,
    pub score: f64,
}

impl Candidate {
    /// Score as a percentage with one decimal, e.g. `"87.5%"`.
    pub fn score_percent(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }
}

/// Response of `GET /listings/{ad_id}/candidates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateList {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}
