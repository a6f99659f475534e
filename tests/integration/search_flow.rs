use super::*;
use gantry::search::SearchQuery;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn local_search_serves_the_rebuilt_index() {
    let temp = TempDir::new().unwrap();
    let container = file_system_container(temp.path());
    container.db.migrate().unwrap();
    container
        .db
        .create_package("acme.widgets", "Widget toolkit", &[])
        .unwrap();
    container.db.add_version("acme.widgets", "1.0.0").unwrap();
    container.db.record_downloads("acme.widgets", 7).unwrap();
    container
        .db
        .create_package("acme.gadgets", "Gadget widgets", &[])
        .unwrap();
    container.db.add_version("acme.gadgets", "2.0.0").unwrap();
    container.db.record_downloads("acme.gadgets", 41).unwrap();

    container.indexing.rebuild_index().await.unwrap();

    let results = container
        .search
        .search(&SearchQuery::new("widgets", 10))
        .await
        .unwrap();
    assert_eq!(results.total_hits, 2);
    // Ordered by downloads
    assert_eq!(results.hits[0].package_id, "acme.gadgets");
    assert_eq!(results.hits[1].package_id, "acme.widgets");

    // The index survives on disk for the next process
    let index_path = temp
        .path()
        .join("gallery")
        .join("index")
        .join("packages.json");
    assert!(index_path.is_file());
}

#[tokio::test]
async fn external_search_is_wired_to_the_remote_service() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "widgets"))
        .and(query_param("take", "5"))
        .and(header("X-Resource-Type", "search-query/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_hits": 1,
            "hits": [{
                "package_id": "acme.widgets",
                "version": "1.0.0",
                "description": "Widget toolkit",
                "downloads": 7
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = file_system_config(temp.path());
    config.search.service_discovery_uri = Some(mock_server.uri());
    let container = build(config);

    let results = container
        .search
        .search(&SearchQuery::new("widgets", 5))
        .await
        .unwrap();
    assert_eq!(results.total_hits, 1);
    assert_eq!(results.hits[0].package_id, "acme.widgets");
}

#[tokio::test]
async fn external_reindex_delegates_to_the_remote_service() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reindex"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = file_system_config(temp.path());
    config.search.service_discovery_uri = Some(mock_server.uri());
    let container = build(config);

    container.indexing.rebuild_index().await.unwrap();
}
