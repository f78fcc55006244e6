//! Vehicle listings awaiting or having undergone trim normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// A raw vehicle advertisement record.
///
/// Unprocessed listings carry only the raw fields; processed listings add the
/// normalization outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(deserialize_with = "de::string_or_number")]
    pub ad_id: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub trim: Option<String>,
    #[serde(default)]
    pub normalized_trim: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub needs_review: bool,
    #[serde(default)]
    pub processed_at: Option<String>,
}

impl Listing {
    /// Confidence as a whole percentage, `"N/A"` when unscored.
    pub fn confidence_percent(&self) -> String {
        match self.confidence {
            Some(c) => format!("{:.0}%", c * 100.0),
            None => "N/A".to_string(),
        }
    }

    /// The raw trim text, empty when the listing has none.
    pub fn raw_trim(&self) -> &str {
        self.trim.as_deref().unwrap_or_default()
    }
}

/// Response of `GET /listings/{ad_id}/details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDetails {
    #[serde(default)]
    pub listing: Map<String, Value>,
    #[serde(default)]
    pub details: Option<Map<String, Value>>,
}

impl ListingDetails {
    /// Renders a JSON value for display, `"N/A"` for null.
    pub fn display_value(value: &Value) -> String {
        match value {
            Value::Null => "N/A".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// `"processed_at"` → `"Processed at"`.
    pub fn display_key(key: &str) -> String {
        let spaced = key.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Body of `POST /listings/{ad_id}/assign-trim`.
///
/// Either links the listing to a canonical trim or records a normalized trim
/// text (typed by hand or taken from a candidate).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    TrimMasterId(i64),
    NormalizedTrim(String),
}

/// How a processed listing was matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AssignmentMethod {
    #[default]
    All,
    Exact,
    Fuzzy,
    Manual,
    Unmatched,
}

impl AssignmentMethod {
    /// Query value; `None` for the unfiltered option.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Exact => Some("exact"),
            Self::Fuzzy => Some("fuzzy"),
            Self::Manual => Some("manual"),
            Self::Unmatched => Some("unmatched"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Exact => "Exact",
            Self::Fuzzy => "Fuzzy",
            Self::Manual => "Manual",
            Self::Unmatched => "Unmatched",
        }
    }

    /// Cycles through the options in display order.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Exact,
            Self::Exact => Self::Fuzzy,
            Self::Fuzzy => Self::Manual,
            Self::Manual => Self::Unmatched,
            Self::Unmatched => Self::All,
        }
    }
}

/// Filters for `GET /listings/unprocessed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnprocessedQuery {
    pub limit: u32,
}

impl Default for UnprocessedQuery {
    fn default() -> Self {
        Self { limit: 50 }
    }
}

/// Filters for `GET /listings/processed`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery {
    pub make: String,
    pub model: String,
    pub method: AssignmentMethod,
    min_conf: f64,
    max_conf: f64,
    pub limit: u32,
}

impl Default for ProcessedQuery {
    fn default() -> Self {
        Self {
            make: String::new(),
            model: String::new(),
            method: AssignmentMethod::All,
            min_conf: 0.0,
            max_conf: 1.0,
            limit: 50,
        }
    }
}

impl ProcessedQuery {
    pub fn min_conf(&self) -> f64 {
        self.min_conf
    }

    pub fn max_conf(&self) -> f64 {
        self.max_conf
    }

    /// Sets the lower confidence bound, clamped into `0..=1`.
    ///
    /// Non-finite input counts as 0.
    pub fn set_min_conf(&mut self, value: f64) {
        self.min_conf = clamp_unit(value);
    }

    /// Sets the upper confidence bound, clamped into `0..=1`.
    pub fn set_max_conf(&mut self, value: f64) {
        self.max_conf = clamp_unit(value);
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_numeric_ids() {
        let listing: Listing = serde_json::from_str(
            r#"{"ad_id": 12345, "brand": "Toyota", "model": "Camry", "year": 2020, "trim": "SE"}"#,
        )
        .unwrap();
        assert_eq!(listing.ad_id, "12345");
        assert_eq!(listing.year.as_deref(), Some("2020"));
        assert!(!listing.needs_review);
        assert_eq!(listing.confidence_percent(), "N/A");
    }

    #[test]
    fn test_confidence_percent_rounds() {
        let listing: Listing =
            serde_json::from_str(r#"{"ad_id": "a1", "confidence": 0.876}"#).unwrap();
        assert_eq!(listing.confidence_percent(), "88%");
    }

    #[test]
    fn test_assignment_serializes_single_field() {
        let by_id = serde_json::to_string(&Assignment::TrimMasterId(7)).unwrap();
        assert_eq!(by_id, r#"{"trim_master_id":7}"#);
        let by_text = serde_json::to_string(&Assignment::NormalizedTrim("SE".into())).unwrap();
        assert_eq!(by_text, r#"{"normalized_trim":"SE"}"#);
    }

    #[test]
    fn test_confidence_bounds_are_clamped() {
        let mut q = ProcessedQuery::default();
        q.set_min_conf(-0.5);
        q.set_max_conf(3.0);
        assert_eq!(q.min_conf(), 0.0);
        assert_eq!(q.max_conf(), 1.0);
        q.set_min_conf(f64::NAN);
        assert_eq!(q.min_conf(), 0.0);
    }

    #[test]
    fn test_display_key() {
        assert_eq!(ListingDetails::display_key("processed_at"), "Processed at");
        assert_eq!(ListingDetails::display_value(&Value::Null), "N/A");
        assert_eq!(ListingDetails::display_value(&Value::from(3)), "3");
    }
}
