use crate::core::error::{GantryError, GantryResult};
use std::path::{Path, PathBuf};

/// Get the Gantry home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\gantry
/// - Linux: ~/.config/gantry
/// - macOS: ~/Library/Application Support/gantry
pub fn gantry_home() -> GantryResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| GantryError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("gantry"))
}

/// Get the gallery configuration file path
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\gantry\gallery.yaml
/// - Linux: ~/.config/gantry/gallery.yaml
/// - macOS: ~/Library/Application Support/gantry/gallery.yaml
pub fn config_file() -> GantryResult<PathBuf> {
    Ok(gantry_home()?.join("gallery.yaml"))
}

/// Get the default data directory (used when storage.root is not configured)
///
/// Platform-specific locations:
/// - Windows: %LOCALAPPDATA%\gantry
/// - Linux: ~/.local/share/gantry
/// - macOS: ~/Library/Application Support/gantry
pub fn data_dir() -> GantryResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| GantryError::Path("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("gantry"))
}

/// Get the search index directory under a storage root (<root>/index)
pub fn index_dir(storage_root: &Path) -> PathBuf {
    storage_root.join("index")
}

/// Get the audit record directory under a storage root (<root>/auditing)
pub fn audit_dir(storage_root: &Path) -> PathBuf {
    storage_root.join("auditing")
}

/// Get the mail pickup directory under a storage root (<root>/mail-pickup)
///
/// Used by the pickup-directory transport when no relay is configured.
/// Each message is written as a single .eml file.
pub fn pickup_dir(storage_root: &Path) -> PathBuf {
    storage_root.join("mail-pickup")
}

/// Get the gallery database file under a storage root (<root>/gallery.db)
pub fn gallery_db_file(storage_root: &Path) -> PathBuf {
    storage_root.join("gallery.db")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> GantryResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
