//! Gantry, a self-hosted package gallery
//!
//! This crate provides the gallery service layer: configuration-driven
//! composition of storage, search, statistics, auditing, and
//! authentication backends, plus the transactional mail the gallery
//! sends. It re-exports core functionality from `gantry-core`.

pub use gantry_core::{GantryError, GantryResult, SecretStore};

/// Core module re-exported for backward compatibility.
pub mod core {
    pub use gantry_core::core::*;
    pub use gantry_core::*;

    /// Path module re-exported from gantry-core.
    pub mod path {
        pub use gantry_core::core::path::*;
    }
}

/// Configuration loading, secret resolution, and snapshots.
pub mod config;

/// Gallery database over SQLite.
pub mod db;

/// Domain entities shared across services.
pub mod entities;

/// Package file storage.
pub mod storage;

/// Search index, queries, and autocomplete.
pub mod search;

/// Download statistics and published reports.
pub mod stats;

/// Audit record persistence.
pub mod audit;

/// Credential descriptions and external providers.
pub mod auth;

/// Storage-backed static page content.
pub mod content;

/// Short-lived in-memory caching.
pub mod cache;

/// Persistent error log and the quiet reporter.
pub mod errorlog;

/// Transactional mail: templates, transports, dispatch.
pub mod mail;

/// Dependency injection infrastructure.
pub mod di;
