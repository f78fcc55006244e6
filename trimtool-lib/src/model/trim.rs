//! Canonical trims (the TrimMaster table).

use serde::{Deserialize, Serialize};

/// A canonical vehicle sub-model descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trim {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub trim_name: String,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
}

impl Trim {
    /// `"2018-2022"`, `"2018-Present"` or `"N/A-2022"`.
    pub fn year_range(&self) -> String {
        let start = self
            .year_start
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let end = self
            .year_end
            .map(|y| y.to_string())
            .unwrap_or_else(|| "Present".to_string());
        format!("{}-{}", start, end)
    }

    /// `"Toyota Camry - SE"`.
    pub fn label(&self) -> String {
        format!("{} {} - {}", self.make, self.model, self.trim_name)
    }
}

/// Body of `POST /trims`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTrim {
    pub make: String,
    pub model: String,
    pub trim_name: String,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
}

/// Filters for `GET /trims`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimQuery {
    pub make: String,
    pub model: String,
    pub trim_name: String,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl TrimQuery {
    /// Splits free text `"make model trim words..."` into a query.
    ///
    /// The first word is the make, the second the model, the remainder the
    /// trim name.
    pub fn from_search(text: &str) -> Self {
        let mut parts = text.split_whitespace();
        let make = parts.next().unwrap_or_default().to_string();
        let model = parts.next().unwrap_or_default().to_string();
        let trim_name = parts.collect::<Vec<_>>().join(" ");
        Self {
            make,
            model,
            trim_name,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_search_splits_words() {
        let q = TrimQuery::from_search("  Toyota Land Cruiser VX ");
        assert_eq!(q.make, "Toyota");
        assert_eq!(q.model, "Land");
        assert_eq!(q.trim_name, "Cruiser VX");
    }

    #[test]
    fn test_year_range() {
        let trim = Trim {
            id: 1,
            make: "Kia".into(),
            model: "Rio".into(),
            trim_name: "LX".into(),
            year_start: Some(2018),
            year_end: None,
        };
        assert_eq!(trim.year_range(), "2018-Present");
        assert_eq!(trim.label(), "Kia Rio - LX");
    }
}
