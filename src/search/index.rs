use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::PackageRecord;
use crate::search::{SearchHit, SearchQuery, SearchResults};
use gantry_core::GantryResult;

/// One indexed package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub package_id: String,
    pub version: Option<String>,
    pub description: String,
    pub downloads: u64,
    tokens: HashSet<String>,
}

impl IndexEntry {
    fn from_record(record: &PackageRecord) -> Self {
        let mut tokens = tokenize(&record.id);
        tokens.extend(tokenize(&record.description));
        Self {
            package_id: record.id.clone(),
            version: record.latest_version.clone(),
            description: record.description.clone(),
            downloads: record.downloads,
            tokens,
        }
    }

    /// Every query token must prefix-match some token of the entry
    fn matches(&self, query_tokens: &[String]) -> bool {
        query_tokens
            .iter()
            .all(|q| self.tokens.iter().any(|t| t.starts_with(q.as_str())))
    }

    fn to_hit(&self) -> SearchHit {
        SearchHit {
            package_id: self.package_id.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            downloads: self.downloads,
        }
    }
}

/// Lowercased alphanumeric tokens of a text fragment
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// In-memory search index over the package catalog, persisted as JSON
/// between runs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchIndex {
    entries: HashMap<String, IndexEntry>,
    updated_at: Option<DateTime<Utc>>,
}

impl SearchIndex {
    /// Replace the whole index with the given catalog rows
    pub fn rebuild(&mut self, records: &[PackageRecord]) {
        self.entries = records
            .iter()
            .map(|r| (r.id.clone(), IndexEntry::from_record(r)))
            .collect();
        self.updated_at = Some(Utc::now());
    }

    pub fn upsert(&mut self, record: &PackageRecord) {
        self.entries
            .insert(record.id.clone(), IndexEntry::from_record(record));
        self.updated_at = Some(Utc::now());
    }

    pub fn remove(&mut self, package_id: &str) {
        if self.entries.remove(package_id).is_some() {
            self.updated_at = Some(Utc::now());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// An empty query matches the whole catalog. Hits are ordered by
    /// download count, then id for a stable tie-break.
    pub fn search(&self, query: &SearchQuery) -> SearchResults {
        let query_tokens: Vec<String> = tokenize(&query.text).into_iter().collect();
        let mut matched: Vec<&IndexEntry> = self
            .entries
            .values()
            .filter(|e| e.matches(&query_tokens))
            .collect();
        matched.sort_by(|a, b| {
            b.downloads
                .cmp(&a.downloads)
                .then_with(|| a.package_id.cmp(&b.package_id))
        });
        let total_hits = matched.len() as u64;
        let hits = matched
            .into_iter()
            .take(query.take)
            .map(IndexEntry::to_hit)
            .collect();
        SearchResults { total_hits, hits }
    }

    pub fn save(&self, path: &Path) -> GantryResult<()> {
        if let Some(parent) = path.parent() {
            gantry_core::path::ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> GantryResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load the persisted index when present, otherwise start empty
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
