use std::path::PathBuf;

use async_trait::async_trait;

use crate::di::traits::FileStorageService;
use crate::storage::{validate_folder, validate_name, ChecksumAlgorithm, StoredFile};
use gantry_core::GantryResult;

/// Gallery file store backed by a local directory tree.
///
/// Files land at `<root>/<folder>/<name>`; folders are created on the
/// first write.
pub struct FileSystemStorage {
    root: PathBuf,
    algorithm: ChecksumAlgorithm,
}

impl FileSystemStorage {
    pub fn new(root: impl Into<PathBuf>, algorithm: ChecksumAlgorithm) -> GantryResult<Self> {
        let root = root.into();
        gantry_core::path::ensure_dir(&root)?;
        Ok(Self { root, algorithm })
    }

    fn resolve(&self, folder: &str, name: &str) -> GantryResult<PathBuf> {
        validate_folder(folder)?;
        validate_name(name)?;
        let mut path = self.root.clone();
        for part in folder.split('/') {
            path.push(part);
        }
        path.push(name);
        Ok(path)
    }
}

#[async_trait]
impl FileStorageService for FileSystemStorage {
    async fn save_file(&self, folder: &str, name: &str, data: &[u8]) -> GantryResult<StoredFile> {
        let path = self.resolve(folder, name)?;
        if let Some(parent) = path.parent() {
            gantry_core::path::ensure_dir(parent)?;
        }
        std::fs::write(&path, data)?;
        Ok(StoredFile {
            folder: folder.to_string(),
            name: name.to_string(),
            size: data.len() as u64,
            checksum: self.algorithm.checksum(data),
        })
    }

    async fn get_file(&self, folder: &str, name: &str) -> GantryResult<Option<Vec<u8>>> {
        let path = self.resolve(folder, name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_file(&self, folder: &str, name: &str) -> GantryResult<()> {
        let path = self.resolve(folder, name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn file_exists(&self, folder: &str, name: &str) -> GantryResult<bool> {
        Ok(self.resolve(folder, name)?.is_file())
    }
}
