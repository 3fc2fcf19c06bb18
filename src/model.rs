use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provider-map key holding the item's id in our own catalog.
pub const CATALOG_PROVIDER: &str = "catalog";
/// Provider-map key holding the cross-reference id from the secondary catalog.
pub const SECONDARY_PROVIDER: &str = "imdb";

/// The item being identified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub provider_ids: HashMap<String, String>,
}

impl LookupInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_provider_id(mut self, provider: &str, id: impl Into<String>) -> Self {
        self.provider_ids.insert(provider.to_string(), id.into());
        self
    }

    /// Trimmed provider id, `None` when missing or blank.
    pub fn provider_id(&self, provider: &str) -> Option<&str> {
        self.provider_ids
            .get(provider)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn secondary_id(&self) -> Option<&str> {
        self.provider_id(SECONDARY_PROVIDER)
    }
}

/// One row of a keyword search. `year` is kept as the API returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub year: String,
}

impl Candidate {
    pub fn new(id: i64, name: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            year: year.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub total_count: u32,
    pub candidates: Vec<Candidate>,
}

/// Detail record for a single candidate, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRecord {
    pub id: i64,
    pub localized_names: Vec<String>,
    pub secondary_id: Option<String>,
}

/// Result of a stage or of a whole resolution.
///
/// `resolved_id` is only meaningful when `succeeded` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchResult {
    pub succeeded: bool,
    pub resolved_id: i64,
}

impl MatchResult {
    pub const NO_MATCH: MatchResult = MatchResult {
        succeeded: false,
        resolved_id: 0,
    };

    pub fn matched(id: i64) -> Self {
        Self {
            succeeded: true,
            resolved_id: id,
        }
    }

    pub fn resolved_id(&self) -> Option<i64> {
        self.succeeded.then_some(self.resolved_id)
    }
}
