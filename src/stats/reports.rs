use std::sync::Arc;

use async_trait::async_trait;

use crate::di::traits::{FileStorageService, ReportService};
use gantry_core::{GantryError, GantryResult};

/// Storage folder published reports live under
const REPORTS_FOLDER: &str = "stats";

/// Deployment without report publishing
pub struct NullReportService;

#[async_trait]
impl ReportService for NullReportService {
    async fn load(&self, _name: &str) -> GantryResult<Option<String>> {
        Ok(None)
    }
}

/// Reads published reports (`stats/<name>.json`) from the gallery file
/// store.
pub struct CloudReportService {
    storage: Arc<dyn FileStorageService>,
}

impl CloudReportService {
    pub fn new(storage: Arc<dyn FileStorageService>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ReportService for CloudReportService {
    async fn load(&self, name: &str) -> GantryResult<Option<String>> {
        let file = format!("{}.json", name);
        match self.storage.get_file(REPORTS_FOLDER, &file).await? {
            Some(bytes) => {
                let text = String::from_utf8(bytes).map_err(|e| {
                    GantryError::Stats(format!("report '{}' is not valid UTF-8: {}", name, e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }
}
