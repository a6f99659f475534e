//! Mock implementations of service traits for testing

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::traits::{
    AggregateStatsService, AuditingService, CacheService, CredentialDescriber,
    DownloadCountService, ErrorLog, ErrorReporter, FileStorageService, IndexingService,
    PackageIdsQuery, PackageVersionsQuery, ReportService, SearchService, StatisticsService,
};
use crate::audit::AuditRecord;
use crate::auth::{CredentialDescription, ProviderUi};
use crate::entities::Credential;
use crate::errorlog::ErrorEntry;
use crate::mail::message::MailMessage;
use crate::mail::transport::MailTransport;
use crate::search::{SearchHit, SearchQuery, SearchResults};
use crate::stats::{AggregateTotals, StatisticsReport};
use crate::storage::{ChecksumAlgorithm, StoredFile};
use gantry_core::{GantryError, GantryResult};

/// Mock file storage for testing
///
/// Stores files in memory instead of on disk or in blobs.
///
/// # Example
///
/// ```
/// use gantry::di::mocks::MockFileStorage;
///
/// let storage = MockFileStorage::new();
/// storage.add_file("content", "about.md", b"hello".to_vec());
///
/// assert_eq!(storage.files().len(), 1);
/// ```
#[derive(Clone)]
pub struct MockFileStorage {
    files: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
}

impl MockFileStorage {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Pre-populate a file without going through `save_file`
    pub fn add_file(&self, folder: &str, name: &str, data: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert((folder.to_string(), name.to_string()), data);
    }

    /// Every stored file, keyed by `(folder, name)`
    pub fn files(&self) -> HashMap<(String, String), Vec<u8>> {
        self.files.lock().unwrap().clone()
    }
}

impl Default for MockFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStorageService for MockFileStorage {
    async fn save_file(&self, folder: &str, name: &str, data: &[u8]) -> GantryResult<StoredFile> {
        self.files
            .lock()
            .unwrap()
            .insert((folder.to_string(), name.to_string()), data.to_vec());
        Ok(StoredFile {
            folder: folder.to_string(),
            name: name.to_string(),
            size: data.len() as u64,
            checksum: ChecksumAlgorithm::Blake3.checksum(data),
        })
    }

    async fn get_file(&self, folder: &str, name: &str) -> GantryResult<Option<Vec<u8>>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&(folder.to_string(), name.to_string()))
            .cloned())
    }

    async fn delete_file(&self, folder: &str, name: &str) -> GantryResult<()> {
        self.files
            .lock()
            .unwrap()
            .remove(&(folder.to_string(), name.to_string()));
        Ok(())
    }

    async fn file_exists(&self, folder: &str, name: &str) -> GantryResult<bool> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .contains_key(&(folder.to_string(), name.to_string())))
    }
}

/// Mock search service returning pre-populated hits
///
/// Records every query it serves.
#[derive(Clone)]
pub struct MockSearchService {
    hits: Arc<Mutex<Vec<SearchHit>>>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl MockSearchService {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_hit(&self, package_id: &str, downloads: u64) {
        self.hits.lock().unwrap().push(SearchHit {
            package_id: package_id.to_string(),
            version: None,
            description: String::new(),
            downloads,
        });
    }

    /// Queries served so far, in order
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearchService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchService for MockSearchService {
    async fn search(&self, query: &SearchQuery) -> GantryResult<SearchResults> {
        self.queries.lock().unwrap().push(query.clone());
        let hits = self.hits.lock().unwrap();
        Ok(SearchResults {
            total_hits: hits.len() as u64,
            hits: hits.iter().take(query.take).cloned().collect(),
        })
    }
}

/// Mock indexing service recording rebuilds and package updates
#[derive(Clone)]
pub struct MockIndexingService {
    rebuilds: Arc<Mutex<usize>>,
    updated: Arc<Mutex<Vec<String>>>,
    last_updated: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl MockIndexingService {
    pub fn new() -> Self {
        Self {
            rebuilds: Arc::new(Mutex::new(0)),
            updated: Arc::new(Mutex::new(Vec::new())),
            last_updated: Arc::new(Mutex::new(None)),
        }
    }

    pub fn rebuilds(&self) -> usize {
        *self.rebuilds.lock().unwrap()
    }

    /// Package ids passed to `update_package`, in order
    pub fn updated(&self) -> Vec<String> {
        self.updated.lock().unwrap().clone()
    }

    pub fn set_last_updated(&self, when: DateTime<Utc>) {
        *self.last_updated.lock().unwrap() = Some(when);
    }
}

impl Default for MockIndexingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexingService for MockIndexingService {
    async fn rebuild_index(&self) -> GantryResult<()> {
        *self.rebuilds.lock().unwrap() += 1;
        Ok(())
    }

    async fn update_package(&self, package_id: &str) -> GantryResult<()> {
        self.updated.lock().unwrap().push(package_id.to_string());
        Ok(())
    }

    async fn last_updated(&self) -> GantryResult<Option<DateTime<Utc>>> {
        Ok(*self.last_updated.lock().unwrap())
    }
}

/// Mock error log keeping entries in memory
#[derive(Clone)]
pub struct MockErrorLog {
    entries: Arc<Mutex<Vec<ErrorEntry>>>,
}

impl MockErrorLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl Default for MockErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ErrorLog for MockErrorLog {
    async fn log(&self, entry: &ErrorEntry) -> GantryResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn recent(&self, take: usize) -> GantryResult<Vec<ErrorEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().rev().take(take).cloned().collect())
    }
}

/// Mock error reporter recording `(source, message)` pairs
///
/// What mail tests assert on: a failed send produces exactly one entry
/// here and nothing anywhere else.
#[derive(Clone)]
pub struct MockErrorReporter {
    entries: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockErrorReporter {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl Default for MockErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ErrorReporter for MockErrorReporter {
    async fn report(&self, source: &str, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((source.to_string(), message.to_string()));
    }
}

/// Mock auditing service keeping records in memory
#[derive(Clone)]
pub struct MockAuditingService {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MockAuditingService {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for MockAuditingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditingService for MockAuditingService {
    async fn record(&self, record: &AuditRecord) -> GantryResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Mock report service serving pre-populated report bodies
#[derive(Clone)]
pub struct MockReportService {
    reports: Arc<Mutex<HashMap<String, String>>>,
}

impl MockReportService {
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn add_report(&self, name: &str, content: &str) {
        self.reports
            .lock()
            .unwrap()
            .insert(name.to_string(), content.to_string());
    }
}

impl Default for MockReportService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportService for MockReportService {
    async fn load(&self, name: &str) -> GantryResult<Option<String>> {
        Ok(self.reports.lock().unwrap().get(name).cloned())
    }
}

/// Mock statistics service returning a configurable report
#[derive(Clone)]
pub struct MockStatisticsService {
    report: Arc<Mutex<Option<StatisticsReport>>>,
}

impl MockStatisticsService {
    pub fn new() -> Self {
        Self {
            report: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_report(&self, report: StatisticsReport) {
        *self.report.lock().unwrap() = Some(report);
    }
}

impl Default for MockStatisticsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatisticsService for MockStatisticsService {
    async fn package_downloads(&self) -> GantryResult<Option<StatisticsReport>> {
        Ok(self.report.lock().unwrap().clone())
    }
}

/// Mock aggregate statistics returning fixed totals
#[derive(Clone)]
pub struct MockAggregateStats {
    totals: Arc<Mutex<AggregateTotals>>,
}

impl MockAggregateStats {
    pub fn new() -> Self {
        Self {
            totals: Arc::new(Mutex::new(AggregateTotals::default())),
        }
    }

    pub fn set_totals(&self, totals: AggregateTotals) {
        *self.totals.lock().unwrap() = totals;
    }
}

impl Default for MockAggregateStats {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AggregateStatsService for MockAggregateStats {
    async fn totals(&self) -> GantryResult<AggregateTotals> {
        Ok(*self.totals.lock().unwrap())
    }
}

/// Mock download counts with a refresh counter
#[derive(Clone)]
pub struct MockDownloadCounts {
    counts: Arc<Mutex<HashMap<String, u64>>>,
    refreshes: Arc<Mutex<usize>>,
}

impl MockDownloadCounts {
    pub fn new() -> Self {
        Self {
            counts: Arc::new(Mutex::new(HashMap::new())),
            refreshes: Arc::new(Mutex::new(0)),
        }
    }

    pub fn add_count(&self, package_id: &str, downloads: u64) {
        self.counts
            .lock()
            .unwrap()
            .insert(package_id.to_string(), downloads);
    }

    pub fn refreshes(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }
}

impl Default for MockDownloadCounts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadCountService for MockDownloadCounts {
    async fn refresh(&self) -> GantryResult<()> {
        *self.refreshes.lock().unwrap() += 1;
        Ok(())
    }

    async fn download_count(&self, package_id: &str) -> GantryResult<Option<u64>> {
        Ok(self.counts.lock().unwrap().get(package_id).copied())
    }
}

/// Mock package-id autocomplete over a fixed id list
#[derive(Clone)]
pub struct MockPackageIdsQuery {
    ids: Arc<Mutex<Vec<String>>>,
}

impl MockPackageIdsQuery {
    pub fn new() -> Self {
        Self {
            ids: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_id(&self, package_id: &str) {
        self.ids.lock().unwrap().push(package_id.to_string());
    }
}

impl Default for MockPackageIdsQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageIdsQuery for MockPackageIdsQuery {
    async fn ids(&self, partial: &str, take: usize) -> GantryResult<Vec<String>> {
        Ok(self
            .ids
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.starts_with(partial))
            .take(take)
            .cloned()
            .collect())
    }
}

/// Mock package-version autocomplete over a fixed map
#[derive(Clone)]
pub struct MockPackageVersionsQuery {
    versions: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl MockPackageVersionsQuery {
    pub fn new() -> Self {
        Self {
            versions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn add_version(&self, package_id: &str, version: &str) {
        self.versions
            .lock()
            .unwrap()
            .entry(package_id.to_string())
            .or_default()
            .push(version.to_string());
    }
}

impl Default for MockPackageVersionsQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageVersionsQuery for MockPackageVersionsQuery {
    async fn versions(&self, package_id: &str) -> GantryResult<Vec<String>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .get(package_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Mock cache that never expires entries
#[derive(Clone)]
pub struct MockCacheService {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MockCacheService {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MockCacheService {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheService for MockCacheService {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: String, _ttl: std::time::Duration) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Mock credential describer with a configurable account noun
#[derive(Clone, Default)]
pub struct MockCredentialDescriber {
    noun: Option<String>,
}

impl MockCredentialDescriber {
    /// Describes every credential by its kind, without a sign-in surface
    pub fn new() -> Self {
        Self { noun: None }
    }

    /// Describes every credential as belonging to a provider with UI
    pub fn with_noun(noun: &str) -> Self {
        Self {
            noun: Some(noun.to_string()),
        }
    }
}

impl CredentialDescriber for MockCredentialDescriber {
    fn describe(&self, credential: &Credential) -> CredentialDescription {
        CredentialDescription {
            kind: credential.kind.clone(),
            type_caption: credential.kind.clone(),
            auth_ui: self.noun.as_ref().map(|noun| ProviderUi {
                account_noun: noun.clone(),
            }),
        }
    }
}

/// Mock mail transport recording sent messages
///
/// `failing()` builds a transport whose every send errors, for
/// exercising the failure-reporting path.
///
/// # Example
///
/// ```
/// use gantry::di::mocks::MockMailTransport;
///
/// let transport = MockMailTransport::new();
/// assert!(transport.sent().is_empty());
/// ```
#[derive(Clone)]
pub struct MockMailTransport {
    sent: Arc<Mutex<Vec<MailMessage>>>,
    fail: bool,
}

impl MockMailTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A transport that rejects every message
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// Messages delivered so far, in send order
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockMailTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn send(&self, message: &MailMessage) -> GantryResult<()> {
        if self.fail {
            return Err(GantryError::Mail("transport rejected message".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
