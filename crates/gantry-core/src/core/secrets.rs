use crate::core::{GantryError, GantryResult};
use keyring::Entry;
use std::path::Path;

/// Service name for keyring entries
const KEYRING_SERVICE: &str = "gantry";

/// Manages operator secrets using the OS keychain
///
/// Secrets referenced from gallery.yaml (SMTP relay keys, cloud storage
/// keys, database passwords) are resolved through this store so the
/// configuration file never holds plaintext credentials.
///
/// Platform support:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
pub struct SecretStore;

impl SecretStore {
    /// Store a secret in the OS keychain
    pub fn store(key: &str, value: &str) -> GantryResult<()> {
        let entry = Entry::new(KEYRING_SERVICE, key)
            .map_err(|e| GantryError::Secret(format!("Failed to create keyring entry: {}", e)))?;

        entry.set_password(value).map_err(|e| {
            GantryError::Secret(format!("Failed to store secret in keychain: {}", e))
        })?;

        Ok(())
    }

    /// Retrieve a secret from the OS keychain
    pub fn retrieve(key: &str) -> GantryResult<String> {
        let entry = Entry::new(KEYRING_SERVICE, key)
            .map_err(|e| GantryError::Secret(format!("Failed to create keyring entry: {}", e)))?;

        let password = entry.get_password().map_err(|e| {
            GantryError::Secret(format!("Failed to retrieve secret from keychain: {}", e))
        })?;

        Ok(password)
    }

    /// Delete a secret from the OS keychain
    pub fn delete(key: &str) -> GantryResult<()> {
        let entry = Entry::new(KEYRING_SERVICE, key)
            .map_err(|e| GantryError::Secret(format!("Failed to create keyring entry: {}", e)))?;

        entry.delete_credential().map_err(|e| {
            GantryError::Secret(format!("Failed to delete secret from keychain: {}", e))
        })?;

        Ok(())
    }

    /// Check if a secret exists in the keychain
    pub fn exists(key: &str) -> bool {
        Self::retrieve(key).is_ok()
    }

    /// Set file permissions to 0600 (owner read/write only)
    ///
    /// Used for any secret-bearing files that might exist alongside the
    /// keychain (exported configuration, pickup-directory mail).
    #[cfg(unix)]
    pub fn set_secure_permissions(path: &Path) -> GantryResult<()> {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(path)
            .map_err(|e| GantryError::Secret(format!("Failed to get file metadata: {}", e)))?
            .permissions();

        perms.set_mode(0o600); // rw------- (owner read/write only)
        fs::set_permissions(path, perms)
            .map_err(|e| GantryError::Secret(format!("Failed to set file permissions: {}", e)))?;

        Ok(())
    }

    /// Set file permissions to 0600 (owner read/write only) on Windows
    ///
    /// On Windows, secrets live in the Credential Manager, so file
    /// permissions are not applicable. This is a no-op.
    #[cfg(windows)]
    pub fn set_secure_permissions(_path: &Path) -> GantryResult<()> {
        Ok(())
    }
}
