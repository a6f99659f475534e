//! Error log backends and the quiet reporter used by fire-and-forget
//! paths.
//!
//! Selection rule: no cloud connection string means the gallery database
//! holds the log (`SqlErrorLog`); a connection string switches to the
//! cloud table resource (`TableErrorLog`).

use crate::config::CloudAccount;
use crate::db::GalleryDb;
use crate::di::traits::{ErrorLog, ErrorReporter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gantry_core::{GantryError, GantryResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One logged error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub occurred_at: DateTime<Utc>,
    /// Component that raised the error ("mail.send", "search.reindex")
    pub source: String,
    pub message: String,
    pub detail: String,
}

impl ErrorEntry {
    pub fn new(source: &str, message: &str, detail: &str) -> Self {
        Self {
            occurred_at: Utc::now(),
            source: source.to_string(),
            message: message.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Error log in the gallery database.
pub struct SqlErrorLog {
    db: Arc<GalleryDb>,
}

impl SqlErrorLog {
    pub fn new(db: Arc<GalleryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ErrorLog for SqlErrorLog {
    async fn log(&self, entry: &ErrorEntry) -> GantryResult<()> {
        self.db.insert_error(entry)
    }

    async fn recent(&self, take: usize) -> GantryResult<Vec<ErrorEntry>> {
        self.db.recent_errors(take)
    }
}

/// Error log in the cloud table resource `errorlog`.
pub struct TableErrorLog {
    client: reqwest::Client,
    endpoint: String,
    key: String,
}

impl TableErrorLog {
    pub fn from_account(account: &CloudAccount) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: account.endpoint.trim_end_matches('/').to_string(),
            key: account.key.clone(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/tables/errorlog", self.endpoint)
    }
}

#[async_trait]
impl ErrorLog for TableErrorLog {
    async fn log(&self, entry: &ErrorEntry) -> GantryResult<()> {
        let response = self
            .client
            .post(self.table_url())
            .header("Authorization", format!("SharedKey {}", self.key))
            .json(entry)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Storage(format!(
                "error log table returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn recent(&self, take: usize) -> GantryResult<Vec<ErrorEntry>> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("take", take.to_string())])
            .header("Authorization", format!("SharedKey {}", self.key))
            .send()
            .await?
            .error_for_status()?;
        let entries: Vec<ErrorEntry> = response.json().await?;
        Ok(entries)
    }
}

/// Reporter for paths that must never surface an error to their caller.
///
/// Emits a tracing event and writes the entry to the configured error
/// log. A failing error log is itself swallowed (logged at debug) so
/// reporting can never propagate.
pub struct QuietReporter {
    error_log: Arc<dyn ErrorLog>,
}

impl QuietReporter {
    pub fn new(error_log: Arc<dyn ErrorLog>) -> Self {
        Self { error_log }
    }
}

#[async_trait]
impl ErrorReporter for QuietReporter {
    async fn report(&self, source: &str, message: &str) {
        tracing::error!(source = source, "{}", message);
        let entry = ErrorEntry::new(source, message, "");
        if let Err(e) = self.error_log.log(&entry).await {
            tracing::debug!(source = source, "error log write failed: {}", e);
        }
    }
}
