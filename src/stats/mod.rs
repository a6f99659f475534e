pub mod aggregates;
pub mod downloads;
pub mod reports;
pub mod statistics;

pub use aggregates::{JsonAggregateStats, SqlAggregateStats};
pub use downloads::{CloudDownloadCountService, SqlDownloadCountService};
pub use reports::{CloudReportService, NullReportService};
pub use statistics::{JsonStatisticsService, NullStatisticsService};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gallery-wide totals shown on the landing page
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateTotals {
    /// Package versions in the catalog
    pub total_packages: u64,
    /// Distinct package ids
    pub unique_packages: u64,
    pub downloads: u64,
}

/// One row of a downloads report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRow {
    pub package_id: String,
    pub downloads: u64,
}

/// A parsed statistics report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rows: Vec<DownloadRow>,
}
