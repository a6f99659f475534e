use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::db::GalleryDb;
use crate::di::traits::{DownloadCountService, StatisticsService};
use gantry_core::GantryResult;

/// Counts served live from the gallery database
pub struct SqlDownloadCountService {
    db: Arc<GalleryDb>,
}

impl SqlDownloadCountService {
    pub fn new(db: Arc<GalleryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DownloadCountService for SqlDownloadCountService {
    /// The database is always current, nothing to reload
    async fn refresh(&self) -> GantryResult<()> {
        Ok(())
    }

    async fn download_count(&self, package_id: &str) -> GantryResult<Option<u64>> {
        self.db.download_count(package_id)
    }
}

/// Counts parsed from the downloads report and held in memory until
/// the next `refresh`.
pub struct CloudDownloadCountService {
    statistics: Arc<dyn StatisticsService>,
    counts: RwLock<HashMap<String, u64>>,
}

impl CloudDownloadCountService {
    pub fn new(statistics: Arc<dyn StatisticsService>) -> Self {
        Self {
            statistics,
            counts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl DownloadCountService for CloudDownloadCountService {
    async fn refresh(&self) -> GantryResult<()> {
        let report = self.statistics.package_downloads().await?;
        let mut counts = match self.counts.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counts.clear();
        if let Some(report) = report {
            for row in report.rows {
                counts.insert(row.package_id, row.downloads);
            }
        }
        Ok(())
    }

    async fn download_count(&self, package_id: &str) -> GantryResult<Option<u64>> {
        let counts = match self.counts.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(counts.get(package_id).copied())
    }
}
