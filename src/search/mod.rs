pub mod autocomplete;
pub mod external;
pub mod index;
pub mod local;

pub use external::ExternalSearchService;
pub use index::SearchIndex;
pub use local::{LocalIndexingService, LocalSearchService};

use serde::{Deserialize, Serialize};

/// A gallery search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    /// Maximum number of hits to return
    pub take: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, take: usize) -> Self {
        Self {
            text: text.into(),
            take,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches before `take` was applied
    pub total_hits: u64,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub package_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub downloads: u64,
}
