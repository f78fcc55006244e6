//! Aliases: alternative spellings mapped onto a canonical trim.

use serde::{Deserialize, Serialize};

/// An alias row as returned by `GET /aliases`.
///
/// The backend joins the master trim's make/model/name onto each alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub id: i64,
    pub trim_master_id: i64,
    pub alias: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub trim_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Alias {
    /// `"Toyota Camry - SE"`, with blanks for missing parts.
    pub fn master_label(&self) -> String {
        format!(
            "{} {} - {}",
            self.make.as_deref().unwrap_or_default(),
            self.model.as_deref().unwrap_or_default(),
            self.trim_name.as_deref().unwrap_or_default()
        )
    }
}

/// Body of `POST /aliases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlias {
    pub trim_master_id: i64,
    pub alias: String,
}

impl NewAlias {
    /// Aliases are stored lowercased and trimmed.
    pub fn new(trim_master_id: i64, alias: &str) -> Self {
        Self {
            trim_master_id,
            alias: alias.trim().to_lowercase(),
        }
    }
}

/// Filters for `GET /aliases`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasQuery {
    pub make: String,
    pub model: String,
}
