//! Trait definitions for dependency injection
//!
//! Every gallery capability is expressed as a `Send + Sync` trait so the
//! composition root can select an implementation family per capability
//! and tests can inject the in-memory fakes from `di::mocks`.

use crate::audit::AuditRecord;
use crate::auth::CredentialDescription;
use crate::entities::Credential;
use crate::errorlog::ErrorEntry;
use crate::search::{SearchQuery, SearchResults};
use crate::stats::{AggregateTotals, StatisticsReport};
use crate::storage::StoredFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gantry_core::GantryResult;
use std::time::Duration;

/// Trait for package file storage
///
/// Files live under `<folder>/<name>`; the cloud implementation maps the
/// same layout onto blob paths.
#[async_trait]
pub trait FileStorageService: Send + Sync {
    /// Store a file, computing its content checksum
    async fn save_file(&self, folder: &str, name: &str, data: &[u8]) -> GantryResult<StoredFile>;

    /// Read a file; `None` when it does not exist
    async fn get_file(&self, folder: &str, name: &str) -> GantryResult<Option<Vec<u8>>>;

    /// Delete a file. Deleting a missing file is not an error.
    async fn delete_file(&self, folder: &str, name: &str) -> GantryResult<()>;

    /// Check whether a file exists
    async fn file_exists(&self, folder: &str, name: &str) -> GantryResult<bool>;
}

/// Trait for package search
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> GantryResult<SearchResults>;
}

/// Trait for maintaining the search index
#[async_trait]
pub trait IndexingService: Send + Sync {
    /// Rebuild the index from the gallery database
    async fn rebuild_index(&self) -> GantryResult<()>;

    /// Refresh a single package in the index
    async fn update_package(&self, package_id: &str) -> GantryResult<()>;

    /// When the index was last written, if known
    async fn last_updated(&self) -> GantryResult<Option<DateTime<Utc>>>;
}

/// Trait for the persistent error log
#[async_trait]
pub trait ErrorLog: Send + Sync {
    async fn log(&self, entry: &ErrorEntry) -> GantryResult<()>;

    /// Most recent entries, newest first
    async fn recent(&self, take: usize) -> GantryResult<Vec<ErrorEntry>>;
}

/// Trait for reporting errors from paths that must not fail their caller
///
/// Implementations never propagate: reporting an error is best-effort by
/// contract.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, source: &str, message: &str);
}

/// Trait for recording audit events
#[async_trait]
pub trait AuditingService: Send + Sync {
    async fn record(&self, record: &AuditRecord) -> GantryResult<()>;
}

/// Trait for loading raw statistics reports by name
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Raw report content; `None` when the report is unavailable
    async fn load(&self, name: &str) -> GantryResult<Option<String>>;
}

/// Trait for the per-package download statistics report
#[async_trait]
pub trait StatisticsService: Send + Sync {
    /// `None` when statistics are not produced in this deployment
    async fn package_downloads(&self) -> GantryResult<Option<StatisticsReport>>;
}

/// Trait for gallery-wide aggregate totals
#[async_trait]
pub trait AggregateStatsService: Send + Sync {
    async fn totals(&self) -> GantryResult<AggregateTotals>;
}

/// Trait for per-package download counts
#[async_trait]
pub trait DownloadCountService: Send + Sync {
    /// Reload counts from the backing source
    async fn refresh(&self) -> GantryResult<()>;

    /// `None` when the package is unknown to this service
    async fn download_count(&self, package_id: &str) -> GantryResult<Option<u64>>;
}

/// Trait for package-id autocomplete
#[async_trait]
pub trait PackageIdsQuery: Send + Sync {
    /// Ids starting with `partial`, most relevant first
    async fn ids(&self, partial: &str, take: usize) -> GantryResult<Vec<String>>;
}

/// Trait for package-version autocomplete
#[async_trait]
pub trait PackageVersionsQuery: Send + Sync {
    async fn versions(&self, package_id: &str) -> GantryResult<Vec<String>>;
}

/// Trait for short-lived value caching
pub trait CacheService: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: String, ttl: Duration);

    fn remove(&self, key: &str);
}

/// Trait for describing credentials in user-facing text
pub trait CredentialDescriber: Send + Sync {
    fn describe(&self, credential: &Credential) -> CredentialDescription;
}
