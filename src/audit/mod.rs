use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::di::traits::{AuditingService, FileStorageService};
use crate::storage::{validate_folder, validate_name};
use gantry_core::{GantryError, GantryResult};

/// Timestamp component of an audit file name, sortable lexically
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

/// One recorded gallery event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub action: String,
    pub resource_kind: String,
    pub resource_id: String,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl AuditRecord {
    pub fn new(action: &str, resource_kind: &str, resource_id: &str, actor: &str) -> Self {
        Self {
            action: action.to_string(),
            resource_kind: resource_kind.to_string(),
            resource_id: resource_id.to_string(),
            actor: actor.to_string(),
            timestamp: Utc::now(),
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.action
        )
    }

    fn validate(&self) -> GantryResult<()> {
        validate_name(&self.resource_kind)?;
        validate_name(&self.resource_id)?;
        validate_name(&self.action)?;
        Ok(())
    }
}

/// Writes audit records under `<root>/<kind>/<id>/` as JSON files
pub struct FileSystemAuditingService {
    root: PathBuf,
}

impl FileSystemAuditingService {
    pub fn new(root: impl Into<PathBuf>) -> GantryResult<Self> {
        let root = root.into();
        gantry_core::path::ensure_dir(&root)?;
        Ok(Self { root })
    }

    /// Records for one resource, oldest first
    pub fn records_for(&self, resource_kind: &str, resource_id: &str) -> GantryResult<Vec<AuditRecord>> {
        validate_name(resource_kind)?;
        validate_name(resource_id)?;
        let dir = self.root.join(resource_kind).join(resource_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "json")
            {
                paths.push(entry.path().to_path_buf());
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let text = std::fs::read_to_string(&path)?;
            let record: AuditRecord = serde_json::from_str(&text).map_err(|e| {
                GantryError::Audit(format!("malformed audit record {}: {}", path.display(), e))
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditingService for FileSystemAuditingService {
    async fn record(&self, record: &AuditRecord) -> GantryResult<()> {
        record.validate()?;
        let dir = self.root.join(&record.resource_kind).join(&record.resource_id);
        gantry_core::path::ensure_dir(&dir)?;
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(dir.join(record.file_name()), json)?;
        Ok(())
    }
}

/// Same layout, persisted through the gallery file store
pub struct CloudAuditingService {
    storage: Arc<dyn FileStorageService>,
}

impl CloudAuditingService {
    pub fn new(storage: Arc<dyn FileStorageService>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AuditingService for CloudAuditingService {
    async fn record(&self, record: &AuditRecord) -> GantryResult<()> {
        record.validate()?;
        let folder = format!("auditing/{}/{}", record.resource_kind, record.resource_id);
        validate_folder(&folder)?;
        let json = serde_json::to_string(record)?;
        self.storage
            .save_file(&folder, &record.file_name(), json.as_bytes())
            .await?;
        Ok(())
    }
}
