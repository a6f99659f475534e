use std::sync::Arc;

use async_trait::async_trait;

use crate::di::traits::{ReportService, StatisticsService};
use crate::stats::StatisticsReport;
use gantry_core::GantryResult;

/// Report name with per-package download rows
const DOWNLOADS_REPORT: &str = "downloads";

/// Deployment that produces no statistics
pub struct NullStatisticsService;

#[async_trait]
impl StatisticsService for NullStatisticsService {
    async fn package_downloads(&self) -> GantryResult<Option<StatisticsReport>> {
        Ok(None)
    }
}

/// Parses the published downloads report. A report that has not been
/// published yet is an absent result, not an error.
pub struct JsonStatisticsService {
    reports: Arc<dyn ReportService>,
}

impl JsonStatisticsService {
    pub fn new(reports: Arc<dyn ReportService>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl StatisticsService for JsonStatisticsService {
    async fn package_downloads(&self) -> GantryResult<Option<StatisticsReport>> {
        match self.reports.load(DOWNLOADS_REPORT).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
