use std::sync::Arc;
use std::time::Duration;

use crate::di::traits::{CacheService, FileStorageService};
use gantry_core::{GantryError, GantryResult};

/// Storage folder gallery page fragments live under
const CONTENT_FOLDER: &str = "content";
/// How long a fragment is served from cache before re-reading storage
const CONTENT_TTL: Duration = Duration::from_secs(300);

/// Serves editable gallery page fragments (markdown) with short-lived
/// caching in front of the file store.
pub struct ContentService {
    storage: Arc<dyn FileStorageService>,
    cache: Arc<dyn CacheService>,
}

impl ContentService {
    pub fn new(storage: Arc<dyn FileStorageService>, cache: Arc<dyn CacheService>) -> Self {
        Self { storage, cache }
    }

    /// `None` when no fragment with that name has been published
    pub async fn get_content(&self, name: &str) -> GantryResult<Option<String>> {
        let key = format!("content:{}", name);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Some(cached));
        }
        let file = format!("{}.md", name);
        match self.storage.get_file(CONTENT_FOLDER, &file).await? {
            Some(bytes) => {
                let text = String::from_utf8(bytes).map_err(|e| {
                    GantryError::Validation(format!(
                        "content fragment '{}' is not valid UTF-8: {}",
                        name, e
                    ))
                })?;
                self.cache.put(&key, text.clone(), CONTENT_TTL);
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }
}
