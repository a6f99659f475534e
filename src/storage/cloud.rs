use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::CloudAccount;
use crate::di::traits::FileStorageService;
use crate::storage::{validate_folder, validate_name, ChecksumAlgorithm, StoredFile};
use gantry_core::{GantryError, GantryResult};

/// Container all gallery folders live under on the blob endpoint
const DEFAULT_CONTAINER: &str = "gallery";

/// Gallery file store backed by an HTTP blob endpoint.
///
/// Blobs are addressed as `<endpoint>/<container>/<folder>/<name>` and
/// every request carries the account's shared key.
pub struct CloudBlobStorage {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    container: String,
    algorithm: ChecksumAlgorithm,
}

impl CloudBlobStorage {
    pub fn from_account(account: &CloudAccount, algorithm: ChecksumAlgorithm) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: account.endpoint.trim_end_matches('/').to_string(),
            key: account.key.clone(),
            container: DEFAULT_CONTAINER.to_string(),
            algorithm,
        }
    }

    fn blob_url(&self, folder: &str, name: &str) -> GantryResult<String> {
        validate_folder(folder)?;
        validate_name(name)?;
        let encoded_folder = folder
            .split('/')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!(
            "{}/{}/{}/{}",
            self.endpoint,
            self.container,
            encoded_folder,
            urlencoding::encode(name)
        ))
    }

    fn authorization(&self) -> String {
        format!("SharedKey {}", self.key)
    }
}

#[async_trait]
impl FileStorageService for CloudBlobStorage {
    async fn save_file(&self, folder: &str, name: &str, data: &[u8]) -> GantryResult<StoredFile> {
        let url = self.blob_url(folder, name)?;
        let checksum = self.algorithm.checksum(data);
        let response = self
            .client
            .put(&url)
            .header("Authorization", self.authorization())
            .header("x-content-checksum", &checksum)
            .body(data.to_vec())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Storage(format!(
                "blob upload to {} failed with status {}",
                url,
                response.status()
            )));
        }
        Ok(StoredFile {
            folder: folder.to_string(),
            name: name.to_string(),
            size: data.len() as u64,
            checksum,
        })
    }

    async fn get_file(&self, folder: &str, name: &str) -> GantryResult<Option<Vec<u8>>> {
        let url = self.blob_url(folder, name)?;
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(GantryError::Storage(format!(
                "blob download from {} failed with status {}",
                url,
                response.status()
            )));
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }

    async fn delete_file(&self, folder: &str, name: &str) -> GantryResult<()> {
        let url = self.blob_url(folder, name)?;
        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.authorization())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(GantryError::Storage(format!(
            "blob delete at {} failed with status {}",
            url,
            response.status()
        )))
    }

    async fn file_exists(&self, folder: &str, name: &str) -> GantryResult<bool> {
        let url = self.blob_url(folder, name)?;
        let response = self
            .client
            .head(&url)
            .header("Authorization", self.authorization())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(GantryError::Storage(format!(
                "blob probe at {} failed with status {}",
                url,
                response.status()
            )));
        }
        Ok(true)
    }
}
