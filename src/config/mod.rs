//! Gallery configuration: the immutable snapshot every service selection
//! and every notification reads from.
//!
//! Configuration is loaded from `gallery.yaml`, secret placeholders are
//! resolved, the result is validated fail-fast, and the snapshot is
//! published as an `Arc`. `refresh()` re-reads the file and atomically
//! swaps the published snapshot; readers holding the old `Arc` keep a
//! consistent view.

use gantry_core::core::path::{config_file, ensure_dir};
use gantry_core::{GantryError, GantryResult, SecretStore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Which storage family the gallery runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Not configured; treated as `FileSystem`.
    #[default]
    NotSpecified,
    FileSystem,
    Cloud,
}

/// Which backend resolves `$$name$$` secret placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecretBackend {
    /// Placeholders are an error.
    #[default]
    None,
    /// Placeholders resolve through the OS keychain.
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GallerySettings {
    /// Display name used in mail subjects and bodies
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Address support mail is sent from and to
    #[serde(default = "default_owner_address")]
    pub owner_address: String,

    /// Address account-lifecycle mail is sent from
    #[serde(default = "default_no_reply_address")]
    pub no_reply_address: String,

    /// Public base URL of the gallery
    #[serde(default = "default_site_root")]
    pub site_root: String,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            owner_address: default_owner_address(),
            no_reply_address: default_no_reply_address(),
            site_root: default_site_root(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StorageSettings {
    /// Storage family; `not_specified` behaves as `file_system`
    #[serde(default)]
    pub kind: StorageType,

    /// File-storage root (defaults to the platform data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// Cloud account in `endpoint=<url>;key=<base64>` form.
    /// Presence also selects the table-backed error log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Checksum algorithm for stored files
    /// - "blake3": BLAKE3 (default)
    /// - "sha256": SHA-256
    #[serde(default = "default_checksum_algorithm")]
    pub checksum_algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchSettings {
    /// Base URL of the external search service. Absent means local
    /// search and local indexing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_discovery_uri: Option<String>,

    /// Resource type requested from the external search service
    #[serde(default = "default_search_resource_type")]
    pub search_resource_type: String,

    /// Resource type for service-backed autocomplete. Empty or absent
    /// keeps autocomplete on the local database even when the discovery
    /// URI is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete_resource_type: Option<String>,

    /// Local search index file (defaults under the storage root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DatabaseSettings {
    /// Gallery database file (defaults under the storage root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MailSettings {
    /// HTTP mail relay endpoint. Absent means pickup-directory delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,

    /// Bearer key for the relay. May be a `$$secret$$` placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_api_key: Option<String>,

    /// Directory .eml files are written to when no relay is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_directory: Option<String>,
}

/// An external sign-in provider offered by the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProvider {
    /// Credential kinds reference this as `external.<id>`
    pub id: String,
    /// Human-readable provider name ("GitHub")
    pub caption: String,
    /// Noun used in credential notices ("GitHub account")
    pub account_noun: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthSettings {
    #[serde(default)]
    pub external_providers: Vec<ExternalProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SecretSettings {
    #[serde(default)]
    pub backend: SecretBackend,
}

fn default_display_name() -> String {
    "Gantry Gallery".to_string()
}

fn default_owner_address() -> String {
    "support@gantry.local".to_string()
}

fn default_no_reply_address() -> String {
    "noreply@gantry.local".to_string()
}

fn default_site_root() -> String {
    "http://localhost:8080".to_string()
}

fn default_checksum_algorithm() -> String {
    "blake3".to_string()
}

fn default_search_resource_type() -> String {
    "search-query/1.0".to_string()
}

/// The full configuration snapshot. Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfiguration {
    #[serde(default)]
    pub gallery: GallerySettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub mail: MailSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub secrets: SecretSettings,
}

impl AppConfiguration {
    /// File-storage root: configured directory or the platform data dir.
    pub fn storage_root(&self) -> GantryResult<PathBuf> {
        if let Some(ref dir) = self.storage.directory {
            Ok(PathBuf::from(dir))
        } else {
            gantry_core::core::path::data_dir()
        }
    }

    /// Gallery database file: configured path or `<root>/gallery.db`.
    pub fn database_path(&self) -> GantryResult<PathBuf> {
        if let Some(ref path) = self.database.path {
            Ok(PathBuf::from(path))
        } else {
            Ok(gantry_core::core::path::gallery_db_file(
                &self.storage_root()?,
            ))
        }
    }

    /// Local search index file: configured path or
    /// `<root>/index/packages.json`.
    pub fn search_index_path(&self) -> GantryResult<PathBuf> {
        if let Some(ref path) = self.search.index_path {
            Ok(PathBuf::from(path))
        } else {
            Ok(gantry_core::core::path::index_dir(&self.storage_root()?).join("packages.json"))
        }
    }

    /// Mail pickup directory: configured path or `<root>/mail-pickup`.
    pub fn mail_pickup_directory(&self) -> GantryResult<PathBuf> {
        if let Some(ref dir) = self.mail.pickup_directory {
            Ok(PathBuf::from(dir))
        } else {
            Ok(gantry_core::core::path::pickup_dir(&self.storage_root()?))
        }
    }

    /// Resolve `$$name$$` placeholders in secret-bearing fields.
    pub fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> GantryResult<()> {
        if let Some(ref conn) = self.storage.connection_string {
            self.storage.connection_string = Some(resolve_placeholders(conn, resolver)?);
        }
        if let Some(ref key) = self.mail.relay_api_key {
            self.mail.relay_api_key = Some(resolve_placeholders(key, resolver)?);
        }
        Ok(())
    }

    /// Fail-fast validation. A snapshot that does not pass is never
    /// published and composition aborts.
    pub fn validate(&self) -> GantryResult<()> {
        if self.gallery.display_name.trim().is_empty() {
            return Err(GantryError::Validation(
                "gallery.display_name must not be empty".to_string(),
            ));
        }
        validate_address("gallery.owner_address", &self.gallery.owner_address)?;
        validate_address("gallery.no_reply_address", &self.gallery.no_reply_address)?;
        validate_url("gallery.site_root", &self.gallery.site_root)?;

        match self.storage.checksum_algorithm.as_str() {
            "blake3" | "sha256" => {}
            other => {
                return Err(GantryError::Validation(format!(
                    "storage.checksum_algorithm must be 'blake3' or 'sha256', got '{}'",
                    other
                )))
            }
        }

        if self.storage.kind == StorageType::Cloud {
            match self.storage.connection_string {
                Some(ref conn) if !conn.trim().is_empty() => {}
                _ => {
                    return Err(GantryError::Validation(
                        "storage.kind 'cloud' requires storage.connection_string".to_string(),
                    ))
                }
            }
        }
        if let Some(ref conn) = self.storage.connection_string {
            if !conn.trim().is_empty() {
                parse_connection_string(conn)?;
            }
        }

        if let Some(ref uri) = self.search.service_discovery_uri {
            if !uri.trim().is_empty() {
                validate_url("search.service_discovery_uri", uri)?;
            }
        }
        if let Some(ref url) = self.mail.relay_url {
            if !url.trim().is_empty() {
                validate_url("mail.relay_url", url)?;
            }
        }

        Ok(())
    }
}

fn validate_address(field: &str, value: &str) -> GantryResult<()> {
    if value.trim().is_empty() || !value.contains('@') {
        return Err(GantryError::Validation(format!(
            "{} must be a non-empty email address",
            field
        )));
    }
    Ok(())
}

fn validate_url(field: &str, value: &str) -> GantryResult<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(GantryError::Validation(format!(
            "{} must be an absolute http(s) URL, got '{}'",
            field, value
        )));
    }
    Ok(())
}

/// A parsed cloud account connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudAccount {
    pub endpoint: String,
    /// Base64 shared key, passed as-is in the Authorization header
    pub key: String,
}

/// Parse `endpoint=<url>;key=<base64>` (segment order is free).
pub fn parse_connection_string(conn: &str) -> GantryResult<CloudAccount> {
    let mut endpoint = None;
    let mut key = None;

    for segment in conn.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (name, value) = segment.split_once('=').ok_or_else(|| {
            GantryError::Config(format!(
                "Invalid connection string segment '{}': expected name=value",
                segment
            ))
        })?;
        match name.trim().to_ascii_lowercase().as_str() {
            "endpoint" => endpoint = Some(value.trim().to_string()),
            "key" => key = Some(value.trim().to_string()),
            other => {
                return Err(GantryError::Config(format!(
                    "Unknown connection string segment '{}'",
                    other
                )))
            }
        }
    }

    let endpoint = endpoint.ok_or_else(|| {
        GantryError::Config("Connection string is missing the endpoint segment".to_string())
    })?;
    let key = key.ok_or_else(|| {
        GantryError::Config("Connection string is missing the key segment".to_string())
    })?;

    validate_url("connection string endpoint", &endpoint)?;
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(&key)
        .map_err(|e| GantryError::Config(format!("Connection string key is not base64: {}", e)))?;

    Ok(CloudAccount {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        key,
    })
}

/// Resolves secret placeholders found in configuration values.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, name: &str) -> GantryResult<String>;
}

/// Resolver for the `none` backend: any placeholder is an error.
pub struct NullSecretResolver;

impl SecretResolver for NullSecretResolver {
    fn resolve(&self, name: &str) -> GantryResult<String> {
        Err(GantryError::Secret(format!(
            "Configuration references secret '{}' but secrets.backend is 'none'",
            name
        )))
    }
}

/// Resolver backed by the OS keychain.
pub struct KeyringSecretResolver;

impl SecretResolver for KeyringSecretResolver {
    fn resolve(&self, name: &str) -> GantryResult<String> {
        SecretStore::retrieve(name)
    }
}

/// Replace every `$$name$$` in `value` through the resolver.
/// Text without placeholders passes through untouched.
pub fn resolve_placeholders(value: &str, resolver: &dyn SecretResolver) -> GantryResult<String> {
    let pattern = Regex::new(r"\$\$([A-Za-z0-9_.-]+)\$\$")
        .map_err(|e| GantryError::Config(format!("Invalid placeholder pattern: {}", e)))?;

    let mut result = String::with_capacity(value.len());
    let mut last = 0;
    for captures in pattern.captures_iter(value) {
        let whole = captures
            .get(0)
            .ok_or_else(|| GantryError::Config("Placeholder match without range".to_string()))?;
        let name = captures
            .get(1)
            .ok_or_else(|| GantryError::Config("Placeholder match without name".to_string()))?;
        result.push_str(&value[last..whole.start()]);
        result.push_str(&resolver.resolve(name.as_str())?);
        last = whole.end();
    }
    result.push_str(&value[last..]);
    Ok(result)
}

fn resolver_for(backend: SecretBackend) -> Arc<dyn SecretResolver> {
    match backend {
        SecretBackend::None => Arc::new(NullSecretResolver),
        SecretBackend::Keyring => Arc::new(KeyringSecretResolver),
    }
}

/// Loads, validates, and publishes configuration snapshots.
#[derive(Debug)]
pub struct ConfigurationService {
    path: PathBuf,
    current: RwLock<Arc<AppConfiguration>>,
}

impl ConfigurationService {
    /// Load from the platform config file, creating a default file if
    /// none exists.
    pub fn load() -> GantryResult<Self> {
        Self::load_from(&config_file()?)
    }

    /// Load from an explicit file path, creating a default file if none
    /// exists.
    pub fn load_from(path: &Path) -> GantryResult<Self> {
        if !path.exists() {
            let config = AppConfiguration::default();
            if let Some(parent) = path.parent() {
                ensure_dir(parent)?;
            }
            let content = serde_yaml::to_string(&config)
                .map_err(|e| GantryError::Config(format!("Failed to serialize config: {}", e)))?;
            fs::write(path, content)?;
        }

        let config = read_snapshot(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            current: RwLock::new(Arc::new(config)),
        })
    }

    /// Build a service around an already-validated snapshot (tests).
    pub fn from_snapshot(config: AppConfiguration) -> Self {
        Self {
            path: PathBuf::new(),
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// The current snapshot. Callers that need a stable view across
    /// several reads clone the `Arc` once and keep it.
    pub fn current(&self) -> Arc<AppConfiguration> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Re-read the file and atomically swap the published snapshot.
    /// On failure the previous snapshot stays published.
    pub fn refresh(&self) -> GantryResult<Arc<AppConfiguration>> {
        if self.path.as_os_str().is_empty() {
            return Ok(self.current());
        }
        let config = Arc::new(read_snapshot(&self.path)?);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = config.clone();
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_snapshot(path: &Path) -> GantryResult<AppConfiguration> {
    let content = fs::read_to_string(path)?;
    let mut config: AppConfiguration = serde_yaml::from_str(&content)
        .map_err(|e| GantryError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    let resolver = resolver_for(config.secrets.backend);
    config.resolve_secrets(resolver.as_ref())?;
    config.validate()?;
    Ok(config)
}
