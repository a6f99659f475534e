//! Service container for dependency injection

use std::path::Path;
use std::sync::{Arc, RwLock};

use super::selection::{
    AutocompleteBackend, BackendSelection, ErrorLogBackend, SearchBackend, StorageBackend,
};
use super::traits::{
    AggregateStatsService, AuditingService, CacheService, CredentialDescriber,
    DownloadCountService, ErrorLog, ErrorReporter, FileStorageService, IndexingService,
    PackageIdsQuery, PackageVersionsQuery, ReportService, SearchService, StatisticsService,
};
use crate::audit::{CloudAuditingService, FileSystemAuditingService};
use crate::auth::AuthenticationService;
use crate::cache::MemoryCacheService;
use crate::config::{
    parse_connection_string, AppConfiguration, CloudAccount, ConfigurationService,
};
use crate::content::ContentService;
use crate::db::GalleryDb;
use crate::errorlog::{QuietReporter, SqlErrorLog, TableErrorLog};
use crate::mail::MailService;
use crate::search::autocomplete::{
    DbPackageIdsQuery, DbPackageVersionsQuery, ServicePackageIdsQuery, ServicePackageVersionsQuery,
};
use crate::search::{ExternalSearchService, LocalIndexingService, LocalSearchService, SearchIndex};
use crate::stats::{
    CloudDownloadCountService, CloudReportService, JsonAggregateStats, JsonStatisticsService,
    NullReportService, NullStatisticsService, SqlAggregateStats, SqlDownloadCountService,
};
use crate::storage::{ChecksumAlgorithm, CloudBlobStorage, FileSystemStorage};
use gantry_core::{GantryError, GantryResult};

/// The composed service graph of the gallery.
///
/// `build` is the one composition root: it reads a single configuration
/// snapshot, selects an implementation family per capability through
/// `di::selection`, and constructs the whole graph fail-fast. A
/// container either exists completely or not at all; there is no
/// partially wired state to observe.
///
/// All services are `Arc`-shared singletons. Per-unit-of-work state
/// lives in [`RequestScope`], handed out by [`ServiceContainer::scope`].
///
/// # Example (Production)
///
/// ```no_run
/// use std::sync::Arc;
/// use gantry::config::ConfigurationService;
/// use gantry::di::ServiceContainer;
///
/// # fn example() -> gantry_core::GantryResult<()> {
/// let config = Arc::new(ConfigurationService::load()?);
/// let container = ServiceContainer::build(config)?;
/// println!("storage backend: {}", container.selection.storage);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ServiceContainer {
    pub config: Arc<ConfigurationService>,
    /// The per-capability decisions the graph was built from
    pub selection: BackendSelection,
    pub db: Arc<GalleryDb>,
    pub storage: Arc<dyn FileStorageService>,
    pub search: Arc<dyn SearchService>,
    pub indexing: Arc<dyn IndexingService>,
    pub error_log: Arc<dyn ErrorLog>,
    pub error_reporter: Arc<dyn ErrorReporter>,
    pub auditing: Arc<dyn AuditingService>,
    pub reports: Arc<dyn ReportService>,
    pub statistics: Arc<dyn StatisticsService>,
    pub aggregate_stats: Arc<dyn AggregateStatsService>,
    pub download_counts: Arc<dyn DownloadCountService>,
    pub package_ids: Arc<dyn PackageIdsQuery>,
    pub package_versions: Arc<dyn PackageVersionsQuery>,
    pub content: Arc<ContentService>,
    pub credential_describer: Arc<dyn CredentialDescriber>,
    pub mail: Arc<MailService>,
}

/// State pinned for one logical unit of work.
///
/// The configuration snapshot does not move under the unit even when
/// `refresh` swaps the published one, and the cache starts empty so no
/// unit observes another's entries.
pub struct RequestScope {
    pub config: Arc<AppConfiguration>,
    pub cache: Arc<dyn CacheService>,
}

fn cloud_account(config: &AppConfiguration) -> GantryResult<CloudAccount> {
    let conn = config.storage.connection_string.as_deref().unwrap_or_default();
    parse_connection_string(conn)
}

fn discovery_uri(config: &AppConfiguration) -> GantryResult<&str> {
    match config.search.service_discovery_uri.as_deref().map(str::trim) {
        Some(uri) if !uri.is_empty() => Ok(uri),
        _ => Err(GantryError::Config(
            "search.service_discovery_uri is required for service-backed search".to_string(),
        )),
    }
}

impl ServiceContainer {
    /// Compose the full service graph from the current configuration
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot fails validation, a secret or
    /// connection string cannot be used, or the gallery database cannot
    /// be opened. Nothing is exposed on failure; the caller exits and a
    /// new process is the only recovery.
    pub fn build(config: Arc<ConfigurationService>) -> GantryResult<Self> {
        let snapshot = config.current();
        snapshot.validate()?;

        let selection = BackendSelection::from_config(&snapshot);
        let algorithm = ChecksumAlgorithm::from_name(&snapshot.storage.checksum_algorithm)?;

        let db = Arc::new(GalleryDb::open(&snapshot.database_path()?)?);

        let storage: Arc<dyn FileStorageService> = match selection.storage {
            StorageBackend::FileSystem => {
                Arc::new(FileSystemStorage::new(snapshot.storage_root()?, algorithm)?)
            }
            StorageBackend::Cloud => Arc::new(CloudBlobStorage::from_account(
                &cloud_account(&snapshot)?,
                algorithm,
            )),
        };

        let error_log: Arc<dyn ErrorLog> = match selection.error_log {
            ErrorLogBackend::Sql => Arc::new(SqlErrorLog::new(Arc::clone(&db))),
            ErrorLogBackend::Table => {
                Arc::new(TableErrorLog::from_account(&cloud_account(&snapshot)?))
            }
        };
        let error_reporter: Arc<dyn ErrorReporter> =
            Arc::new(QuietReporter::new(Arc::clone(&error_log)));

        let (search, indexing): (Arc<dyn SearchService>, Arc<dyn IndexingService>) =
            match selection.search {
                SearchBackend::Local => {
                    let index_path = snapshot.search_index_path()?;
                    let index = Arc::new(RwLock::new(SearchIndex::load_or_default(&index_path)));
                    let search: Arc<dyn SearchService> =
                        Arc::new(LocalSearchService::new(Arc::clone(&index)));
                    let indexing: Arc<dyn IndexingService> = Arc::new(LocalIndexingService::new(
                        Arc::clone(&db),
                        index,
                        index_path,
                    ));
                    (search, indexing)
                }
                SearchBackend::External => {
                    // One client, registered under both capabilities
                    let client = Arc::new(ExternalSearchService::new(
                        discovery_uri(&snapshot)?,
                        snapshot.search.search_resource_type.as_str(),
                    ));
                    let search: Arc<dyn SearchService> = client.clone();
                    let indexing: Arc<dyn IndexingService> = client;
                    (search, indexing)
                }
            };

        // The statistics family follows the storage switch: filesystem
        // deployments answer from SQL and report no published reports,
        // cloud deployments parse the published JSON reports.
        let reports: Arc<dyn ReportService>;
        let statistics: Arc<dyn StatisticsService>;
        let aggregate_stats: Arc<dyn AggregateStatsService>;
        let download_counts: Arc<dyn DownloadCountService>;
        match selection.storage {
            StorageBackend::FileSystem => {
                reports = Arc::new(NullReportService);
                statistics = Arc::new(NullStatisticsService);
                aggregate_stats = Arc::new(SqlAggregateStats::new(Arc::clone(&db)));
                download_counts = Arc::new(SqlDownloadCountService::new(Arc::clone(&db)));
            }
            StorageBackend::Cloud => {
                reports = Arc::new(CloudReportService::new(Arc::clone(&storage)));
                statistics = Arc::new(JsonStatisticsService::new(Arc::clone(&reports)));
                aggregate_stats = Arc::new(JsonAggregateStats::new(Arc::clone(&reports)));
                download_counts =
                    Arc::new(CloudDownloadCountService::new(Arc::clone(&statistics)));
            }
        }

        let auditing: Arc<dyn AuditingService> = match selection.storage {
            StorageBackend::FileSystem => Arc::new(FileSystemAuditingService::new(
                gantry_core::path::audit_dir(&snapshot.storage_root()?),
            )?),
            StorageBackend::Cloud => Arc::new(CloudAuditingService::new(Arc::clone(&storage))),
        };

        let (package_ids, package_versions): (
            Arc<dyn PackageIdsQuery>,
            Arc<dyn PackageVersionsQuery>,
        ) = match selection.autocomplete {
            AutocompleteBackend::Local => (
                Arc::new(DbPackageIdsQuery::new(Arc::clone(&db))),
                Arc::new(DbPackageVersionsQuery::new(Arc::clone(&db))),
            ),
            AutocompleteBackend::Service => {
                let base = discovery_uri(&snapshot)?;
                (
                    Arc::new(ServicePackageIdsQuery::new(base)),
                    Arc::new(ServicePackageVersionsQuery::new(base)),
                )
            }
        };

        let content = Arc::new(ContentService::new(
            Arc::clone(&storage),
            Arc::new(MemoryCacheService::new()),
        ));
        let credential_describer: Arc<dyn CredentialDescriber> = Arc::new(
            AuthenticationService::new(snapshot.auth.external_providers.clone()),
        );
        let mail = Arc::new(MailService::new(
            Arc::clone(&config),
            Arc::clone(&credential_describer),
            Arc::clone(&error_reporter),
        ));

        Ok(Self {
            config,
            selection,
            db,
            storage,
            search,
            indexing,
            error_log,
            error_reporter,
            auditing,
            reports,
            statistics,
            aggregate_stats,
            download_counts,
            package_ids,
            package_versions,
            content,
            credential_describer,
            mail,
        })
    }

    /// Pin state for one logical unit of work: the configuration
    /// snapshot of this moment and an empty cache.
    pub fn scope(&self) -> RequestScope {
        RequestScope {
            config: self.config.current(),
            cache: Arc::new(MemoryCacheService::new()),
        }
    }

    /// Get the file storage service
    pub fn storage(&self) -> &dyn FileStorageService {
        self.storage.as_ref()
    }

    /// Get the search service
    pub fn search(&self) -> &dyn SearchService {
        self.search.as_ref()
    }

    /// Get the indexing service
    pub fn indexing(&self) -> &dyn IndexingService {
        self.indexing.as_ref()
    }

    /// Get the error reporter
    pub fn error_reporter(&self) -> &dyn ErrorReporter {
        self.error_reporter.as_ref()
    }

    /// Get the mail service
    pub fn mail(&self) -> &MailService {
        self.mail.as_ref()
    }
}

/// Convenience for the CLI: load configuration from an explicit file
/// (or the platform default) and compose the container around it.
pub fn bootstrap(config_path: Option<&Path>) -> GantryResult<ServiceContainer> {
    let config = match config_path {
        Some(path) => ConfigurationService::load_from(path)?,
        None => ConfigurationService::load()?,
    };
    ServiceContainer::build(Arc::new(config))
}
