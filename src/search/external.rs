use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::di::traits::{IndexingService, SearchService};
use crate::search::{SearchQuery, SearchResults};
use gantry_core::{GantryError, GantryResult};

/// Header naming the resource flavor negotiated via service discovery
const RESOURCE_TYPE_HEADER: &str = "X-Resource-Type";

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// Client for a separately deployed search service. One instance is
/// registered for both querying and index maintenance.
pub struct ExternalSearchService {
    client: reqwest::Client,
    base: String,
    resource_type: String,
}

impl ExternalSearchService {
    pub fn new(base: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            resource_type: resource_type.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl SearchService for ExternalSearchService {
    async fn search(&self, query: &SearchQuery) -> GantryResult<SearchResults> {
        let url = format!("{}/search", self.base);
        let take = query.take.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("q", query.text.as_str()), ("take", take.as_str())])
            .header(RESOURCE_TYPE_HEADER, &self.resource_type)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Search(format!(
                "search service at {} returned status {}",
                url,
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IndexingService for ExternalSearchService {
    async fn rebuild_index(&self) -> GantryResult<()> {
        let url = format!("{}/reindex", self.base);
        let response = self
            .client
            .post(&url)
            .header(RESOURCE_TYPE_HEADER, &self.resource_type)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Search(format!(
                "reindex request to {} returned status {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }

    async fn update_package(&self, package_id: &str) -> GantryResult<()> {
        let url = format!(
            "{}/reindex/{}",
            self.base,
            urlencoding::encode(package_id)
        );
        let response = self
            .client
            .post(&url)
            .header(RESOURCE_TYPE_HEADER, &self.resource_type)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Search(format!(
                "reindex request to {} returned status {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }

    async fn last_updated(&self) -> GantryResult<Option<DateTime<Utc>>> {
        let url = format!("{}/status", self.base);
        let response = self
            .client
            .get(&url)
            .header(RESOURCE_TYPE_HEADER, &self.resource_type)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GantryError::Search(format!(
                "status request to {} returned status {}",
                url,
                response.status()
            )));
        }
        let status: StatusResponse = response.json().await?;
        Ok(status.last_updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let service = ExternalSearchService::new("https://search.example.com/", "search-query/1.0");
        assert_eq!(service.base(), "https://search.example.com");
    }

    #[tokio::test]
    async fn test_search_sends_query_and_header() {
        use wiremock::matchers::{header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "urn"))
            .and(query_param("take", "5"))
            .and(header(RESOURCE_TYPE_HEADER, "search-query/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_hits": 1,
                "hits": [{"package_id": "urn.core", "version": "1.0.0", "downloads": 42}]
            })))
            .mount(&mock_server)
            .await;

        let service = ExternalSearchService::new(mock_server.uri(), "search-query/1.0");
        let results = service
            .search(&SearchQuery::new("urn", 5))
            .await
            .unwrap();
        assert_eq!(results.total_hits, 1);
        assert_eq!(results.hits[0].package_id, "urn.core");
        assert_eq!(results.hits[0].description, "");
    }

    #[tokio::test]
    async fn test_search_surfaces_service_error() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let service = ExternalSearchService::new(mock_server.uri(), "search-query/1.0");
        assert!(service.search(&SearchQuery::new("urn", 5)).await.is_err());
    }

    #[tokio::test]
    async fn test_rebuild_posts_reindex() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reindex"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&mock_server)
            .await;

        let service = ExternalSearchService::new(mock_server.uri(), "search-query/1.0");
        assert!(service.rebuild_index().await.is_ok());
    }

    #[tokio::test]
    async fn test_update_package_posts_encoded_id() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reindex/urn.core"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&mock_server)
            .await;

        let service = ExternalSearchService::new(mock_server.uri(), "search-query/1.0");
        assert!(service.update_package("urn.core").await.is_ok());
    }

    #[tokio::test]
    async fn test_last_updated_parses_status() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "last_updated": "2024-03-01T12:00:00Z"
            })))
            .mount(&mock_server)
            .await;

        let service = ExternalSearchService::new(mock_server.uri(), "search-query/1.0");
        let updated = service.last_updated().await.unwrap();
        assert!(updated.is_some());
    }

    #[tokio::test]
    async fn test_last_updated_absent_field() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let service = ExternalSearchService::new(mock_server.uri(), "search-query/1.0");
        assert_eq!(service.last_updated().await.unwrap(), None);
    }
}
