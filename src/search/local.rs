use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::GalleryDb;
use crate::di::traits::{IndexingService, SearchService};
use crate::search::index::SearchIndex;
use crate::search::{SearchQuery, SearchResults};
use gantry_core::GantryResult;

/// Maintains the local search index from the gallery database and
/// persists it after every change.
pub struct LocalIndexingService {
    db: Arc<GalleryDb>,
    index: Arc<RwLock<SearchIndex>>,
    index_path: PathBuf,
}

impl LocalIndexingService {
    pub fn new(
        db: Arc<GalleryDb>,
        index: Arc<RwLock<SearchIndex>>,
        index_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            index,
            index_path: index_path.into(),
        }
    }

    fn index_read(&self) -> RwLockReadGuard<'_, SearchIndex> {
        match self.index.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn index_write(&self) -> RwLockWriteGuard<'_, SearchIndex> {
        match self.index.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl IndexingService for LocalIndexingService {
    async fn rebuild_index(&self) -> GantryResult<()> {
        let records = self.db.packages_for_index()?;
        let mut index = self.index_write();
        index.rebuild(&records);
        index.save(&self.index_path)
    }

    async fn update_package(&self, package_id: &str) -> GantryResult<()> {
        let record = self.db.package_for_index(package_id)?;
        let mut index = self.index_write();
        match record {
            Some(record) => index.upsert(&record),
            None => index.remove(package_id),
        }
        index.save(&self.index_path)
    }

    async fn last_updated(&self) -> GantryResult<Option<DateTime<Utc>>> {
        Ok(self.index_read().updated_at())
    }
}

/// Serves queries from the in-memory index shared with the indexer.
pub struct LocalSearchService {
    index: Arc<RwLock<SearchIndex>>,
}

impl LocalSearchService {
    pub fn new(index: Arc<RwLock<SearchIndex>>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl SearchService for LocalSearchService {
    async fn search(&self, query: &SearchQuery) -> GantryResult<SearchResults> {
        let index = match self.index.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(index.search(query))
    }
}
