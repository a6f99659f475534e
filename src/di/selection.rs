//! Configuration-driven backend selection
//!
//! Each gallery capability with more than one implementation family is
//! chosen by a pure function over the configuration snapshot. The
//! functions return closed enums and touch no I/O, so the decision
//! rules are testable without constructing a single service.

use std::fmt;

use crate::config::{AppConfiguration, StorageType};

/// Where error-log entries are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLogBackend {
    /// `error_log` table in the gallery database
    Sql,
    /// Cloud table resource reached over HTTP
    Table,
}

/// Which search and indexing pair serves queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    /// In-process index persisted next to the gallery data
    Local,
    /// Dedicated search service behind the discovery URI
    External,
}

/// Where package files (and the stats/report/auditing family) live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    FileSystem,
    Cloud,
}

/// Which implementations answer autocomplete queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocompleteBackend {
    /// Queries against the gallery database
    Local,
    /// Queries against the external search service
    Service,
}

impl fmt::Display for ErrorLogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLogBackend::Sql => write!(f, "sql"),
            ErrorLogBackend::Table => write!(f, "cloud-table"),
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBackend::Local => write!(f, "local"),
            SearchBackend::External => write!(f, "external"),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::FileSystem => write!(f, "file-system"),
            StorageBackend::Cloud => write!(f, "cloud"),
        }
    }
}

impl fmt::Display for AutocompleteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutocompleteBackend::Local => write!(f, "local"),
            AutocompleteBackend::Service => write!(f, "service"),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A connection string selects the cloud table log; without one the
/// gallery database is the only place entries can go.
pub fn select_error_log(config: &AppConfiguration) -> ErrorLogBackend {
    match non_blank(config.storage.connection_string.as_deref()) {
        Some(_) => ErrorLogBackend::Table,
        None => ErrorLogBackend::Sql,
    }
}

/// The discovery URI switches search and indexing together: one
/// external client serves both capabilities, or neither.
pub fn select_search(config: &AppConfiguration) -> SearchBackend {
    match non_blank(config.search.service_discovery_uri.as_deref()) {
        Some(_) => SearchBackend::External,
        None => SearchBackend::Local,
    }
}

/// `not_specified` behaves as `file_system`. The statistics, report,
/// download-count, and auditing families all follow this switch.
pub fn select_storage(config: &AppConfiguration) -> StorageBackend {
    match config.storage.kind {
        StorageType::FileSystem | StorageType::NotSpecified => StorageBackend::FileSystem,
        StorageType::Cloud => StorageBackend::Cloud,
    }
}

/// Service-backed autocomplete needs both the discovery URI and a
/// resource type. Without the URI the resource type is ignored.
pub fn select_autocomplete(config: &AppConfiguration) -> AutocompleteBackend {
    let uri = non_blank(config.search.service_discovery_uri.as_deref());
    let resource = non_blank(config.search.autocomplete_resource_type.as_deref());
    match (uri, resource) {
        (Some(_), Some(_)) => AutocompleteBackend::Service,
        _ => AutocompleteBackend::Local,
    }
}

/// The one decision per capability, taken from a single snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSelection {
    pub error_log: ErrorLogBackend,
    pub search: SearchBackend,
    pub storage: StorageBackend,
    pub autocomplete: AutocompleteBackend,
}

impl BackendSelection {
    pub fn from_config(config: &AppConfiguration) -> Self {
        Self {
            error_log: select_error_log(config),
            search: select_search(config),
            storage: select_storage(config),
            autocomplete: select_autocomplete(config),
        }
    }
}
