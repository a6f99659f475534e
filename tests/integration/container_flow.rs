use super::*;
use gantry::audit::AuditRecord;
use tempfile::TempDir;

#[tokio::test]
async fn storage_round_trip_through_the_container() {
    let temp = TempDir::new().unwrap();
    let container = file_system_container(temp.path());

    let stored = container
        .storage
        .save_file("packages", "acme.widgets.1.0.0.zip", b"archive bytes")
        .await
        .unwrap();
    assert_eq!(stored.size, 13);
    assert!(stored.checksum.starts_with("blake3:"));

    assert!(container
        .storage
        .file_exists("packages", "acme.widgets.1.0.0.zip")
        .await
        .unwrap());
    let bytes = container
        .storage
        .get_file("packages", "acme.widgets.1.0.0.zip")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bytes, b"archive bytes");

    container
        .storage
        .delete_file("packages", "acme.widgets.1.0.0.zip")
        .await
        .unwrap();
    assert!(!container
        .storage
        .file_exists("packages", "acme.widgets.1.0.0.zip")
        .await
        .unwrap());
}

#[tokio::test]
async fn reported_errors_land_in_the_sql_log() {
    let temp = TempDir::new().unwrap();
    let container = file_system_container(temp.path());
    container.db.migrate().unwrap();

    container
        .error_reporter
        .report("search.reindex", "index rebuild failed")
        .await;

    let recent = container.error_log.recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].source, "search.reindex");
    assert_eq!(recent[0].message, "index rebuild failed");
}

#[tokio::test]
async fn audit_records_are_written_under_the_storage_root() {
    let temp = TempDir::new().unwrap();
    let container = file_system_container(temp.path());

    let record = AuditRecord::new("delete", "package", "acme.widgets", "admin");
    container.auditing.record(&record).await.unwrap();

    let dir = temp
        .path()
        .join("gallery")
        .join("auditing")
        .join("package")
        .join("acme.widgets");
    let files: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(files.len(), 1);
    let json = std::fs::read_to_string(files[0].path()).unwrap();
    assert!(json.contains("\"action\": \"delete\""));
}

#[tokio::test]
async fn autocomplete_queries_answer_from_the_database() {
    let temp = TempDir::new().unwrap();
    let container = file_system_container(temp.path());
    container.db.migrate().unwrap();
    container
        .db
        .create_package("acme.widgets", "Widget toolkit", &[])
        .unwrap();
    container.db.add_version("acme.widgets", "1.0.0").unwrap();
    container.db.add_version("acme.widgets", "1.1.0").unwrap();
    container
        .db
        .create_package("acme.tools", "Assorted tools", &[])
        .unwrap();

    let ids = container.package_ids.ids("acme.w", 20).await.unwrap();
    assert_eq!(ids, vec!["acme.widgets".to_string()]);

    let versions = container
        .package_versions
        .versions("acme.widgets")
        .await
        .unwrap();
    assert_eq!(versions.len(), 2);
}

#[tokio::test]
async fn content_fragments_are_served_from_storage() {
    let temp = TempDir::new().unwrap();
    let container = file_system_container(temp.path());

    container
        .storage
        .save_file("content", "about.md", b"# About this gallery")
        .await
        .unwrap();

    let text = container.content.get_content("about").await.unwrap();
    assert_eq!(text.as_deref(), Some("# About this gallery"));
}
