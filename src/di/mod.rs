//! Dependency injection infrastructure for Gantry
//!
//! The composition root of the gallery: capability traits, the pure
//! configuration-driven backend selection, the fail-fast service
//! container, and in-memory mocks for tests.
//!
//! # Example (Production)
//! ```no_run
//! use std::sync::Arc;
//! use gantry::config::ConfigurationService;
//! use gantry::di::ServiceContainer;
//!
//! # fn example() -> gantry_core::GantryResult<()> {
//! let config = Arc::new(ConfigurationService::load()?);
//! let container = ServiceContainer::build(config)?;
//! let scope = container.scope();
//! # Ok(())
//! # }
//! ```
//!
//! # Example (Selection)
//! ```
//! use gantry::config::AppConfiguration;
//! use gantry::di::{select_search, SearchBackend};
//!
//! let mut config = AppConfiguration::default();
//! assert_eq!(select_search(&config), SearchBackend::Local);
//!
//! config.search.service_discovery_uri = Some("https://search.example.com".to_string());
//! assert_eq!(select_search(&config), SearchBackend::External);
//! ```

pub mod container;
pub mod mocks;
pub mod selection;
pub mod traits;

// Re-export key types
pub use container::{bootstrap, RequestScope, ServiceContainer};
pub use selection::{
    select_autocomplete, select_error_log, select_search, select_storage, AutocompleteBackend,
    BackendSelection, ErrorLogBackend, SearchBackend, StorageBackend,
};
