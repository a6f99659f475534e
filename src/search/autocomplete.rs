use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::db::GalleryDb;
use crate::di::traits::{PackageIdsQuery, PackageVersionsQuery};
use gantry_core::{GantryError, GantryResult};

/// Wire shape shared by both autocomplete endpoints
#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    data: Vec<String>,
}

/// Id completion straight from the gallery database
pub struct DbPackageIdsQuery {
    db: Arc<GalleryDb>,
}

impl DbPackageIdsQuery {
    pub fn new(db: Arc<GalleryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PackageIdsQuery for DbPackageIdsQuery {
    async fn ids(&self, partial: &str, take: usize) -> GantryResult<Vec<String>> {
        self.db.package_ids_like(partial, take)
    }
}

/// Version completion straight from the gallery database
pub struct DbPackageVersionsQuery {
    db: Arc<GalleryDb>,
}

impl DbPackageVersionsQuery {
    pub fn new(db: Arc<GalleryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PackageVersionsQuery for DbPackageVersionsQuery {
    async fn versions(&self, package_id: &str) -> GantryResult<Vec<String>> {
        self.db.versions_of(package_id)
    }
}

/// Id completion delegated to the external search deployment
pub struct ServicePackageIdsQuery {
    client: reqwest::Client,
    base: String,
}

impl ServicePackageIdsQuery {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PackageIdsQuery for ServicePackageIdsQuery {
    async fn ids(&self, partial: &str, take: usize) -> GantryResult<Vec<String>> {
        let url = format!("{}/autocomplete", self.base);
        let take = take.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("q", partial), ("take", take.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Search(format!(
                "autocomplete service at {} returned status {}",
                url,
                response.status()
            )));
        }
        let body: AutocompleteResponse = response.json().await?;
        Ok(body.data)
    }
}

/// Version completion delegated to the external search deployment
pub struct ServicePackageVersionsQuery {
    client: reqwest::Client,
    base: String,
}

impl ServicePackageVersionsQuery {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PackageVersionsQuery for ServicePackageVersionsQuery {
    async fn versions(&self, package_id: &str) -> GantryResult<Vec<String>> {
        let url = format!("{}/autocomplete", self.base);
        let response = self
            .client
            .get(&url)
            .query(&[("id", package_id)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Search(format!(
                "autocomplete service at {} returned status {}",
                url,
                response.status()
            )));
        }
        let body: AutocompleteResponse = response.json().await?;
        Ok(body.data)
    }
}
