pub mod cloud;
pub mod filesystem;

pub use cloud::CloudBlobStorage;
pub use filesystem::FileSystemStorage;

use serde::{Deserialize, Serialize};

use gantry_core::{GantryError, GantryResult};

/// Metadata returned after storing a file in a gallery folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub folder: String,
    pub name: String,
    pub size: u64,
    /// Prefixed checksum of the stored content, e.g. `blake3:<hex>`
    pub checksum: String,
}

/// Content checksum algorithm for stored files
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChecksumAlgorithm {
    Sha256,
    #[default]
    Blake3,
}

impl ChecksumAlgorithm {
    /// Resolve the algorithm configured under `storage.checksum_algorithm`
    pub fn from_name(name: &str) -> GantryResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "blake3" | "" => Ok(ChecksumAlgorithm::Blake3),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            other => Err(GantryError::Storage(format!(
                "unknown checksum algorithm: {}",
                other
            ))),
        }
    }

    /// Detect algorithm from a prefixed checksum string
    pub fn from_checksum(checksum: &str) -> Self {
        if checksum.starts_with("sha256:") {
            ChecksumAlgorithm::Sha256
        } else {
            ChecksumAlgorithm::Blake3
        }
    }

    /// Compute a prefixed checksum of the given bytes
    pub fn checksum(&self, data: &[u8]) -> String {
        match self {
            ChecksumAlgorithm::Blake3 => {
                format!("blake3:{}", blake3::hash(data).to_hex())
            }
            ChecksumAlgorithm::Sha256 => {
                use sha2::{Digest, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(data);
                format!("sha256:{}", hex::encode(hasher.finalize()))
            }
        }
    }

    /// Check bytes against a prefixed checksum recorded earlier
    pub fn verify(data: &[u8], expected: &str) -> bool {
        let algorithm = Self::from_checksum(expected);
        algorithm.checksum(data) == expected
    }
}

/// Folders may nest (`auditing/package/urn.core`) but every component
/// must stay inside the storage root.
pub(crate) fn validate_folder(folder: &str) -> GantryResult<()> {
    if folder.is_empty() {
        return Err(GantryError::Storage("folder name is empty".to_string()));
    }
    for part in folder.split('/') {
        if part.is_empty() || part == "." || part == ".." || part.contains('\\') {
            return Err(GantryError::Storage(format!(
                "invalid folder name: {}",
                folder
            )));
        }
    }
    Ok(())
}

pub(crate) fn validate_name(name: &str) -> GantryResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(GantryError::Storage(format!("invalid file name: {}", name)));
    }
    Ok(())
}
