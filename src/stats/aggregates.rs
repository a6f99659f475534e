use std::sync::Arc;

use async_trait::async_trait;

use crate::db::GalleryDb;
use crate::di::traits::{AggregateStatsService, ReportService};
use crate::stats::AggregateTotals;
use gantry_core::{GantryError, GantryResult};

/// Report name holding gallery-wide totals
const AGGREGATES_REPORT: &str = "aggregates";

/// Totals computed live from the gallery database
pub struct SqlAggregateStats {
    db: Arc<GalleryDb>,
}

impl SqlAggregateStats {
    pub fn new(db: Arc<GalleryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AggregateStatsService for SqlAggregateStats {
    async fn totals(&self) -> GantryResult<AggregateTotals> {
        self.db.aggregate_totals()
    }
}

/// Totals parsed from the published aggregates report. Unlike
/// statistics, totals have no meaningful absent state, so a missing
/// report is an error.
pub struct JsonAggregateStats {
    reports: Arc<dyn ReportService>,
}

impl JsonAggregateStats {
    pub fn new(reports: Arc<dyn ReportService>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl AggregateStatsService for JsonAggregateStats {
    async fn totals(&self) -> GantryResult<AggregateTotals> {
        let raw = self
            .reports
            .load(AGGREGATES_REPORT)
            .await?
            .ok_or_else(|| GantryError::Stats("aggregates report is not available".to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}
