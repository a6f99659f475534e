use super::*;
use gantry::entities::User;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pickup_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn account_mail_lands_in_the_pickup_directory() {
    let temp = TempDir::new().unwrap();
    let container = file_system_container(temp.path());

    let user = User::new("newcomer", "newcomer@example.com");
    container
        .mail
        .send_new_account_email(&user, "http://localhost:8080/confirm?token=abc")
        .await
        .unwrap();
    container.mail.drain().await;

    let pickup = temp.path().join("gallery").join("mail-pickup");
    let files = pickup_files(&pickup);
    assert_eq!(files.len(), 1);
    let eml = std::fs::read_to_string(&files[0]).unwrap();
    assert!(eml.contains("To: newcomer <newcomer@example.com>"));
    assert!(eml.contains("http://localhost:8080/confirm?token=abc"));
}

#[tokio::test]
async fn failed_relay_delivery_is_reported_to_the_error_log() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = file_system_config(temp.path());
    config.mail.relay_url = Some(format!("{}/send", mock_server.uri()));
    let container = build(config);
    container.db.migrate().unwrap();

    let user = User::new("newcomer", "newcomer@example.com");
    container
        .mail
        .send_new_account_email(&user, "http://localhost:8080/confirm?token=abc")
        .await
        .unwrap();
    container.mail.drain().await;

    let recent = container.error_log.recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].source, "mail.send");
    assert!(recent[0].message.contains("returned status 500"));
}

#[tokio::test]
async fn relay_delivery_posts_the_rendered_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = file_system_config(temp.path());
    config.mail.relay_url = Some(format!("{}/send", mock_server.uri()));
    let container = build(config);

    let user = User::new("newcomer", "newcomer@example.com");
    container
        .mail
        .send_new_account_email(&user, "http://localhost:8080/confirm?token=abc")
        .await
        .unwrap();
    container.mail.drain().await;

    // Nothing fell back to the pickup directory
    let pickup = temp.path().join("gallery").join("mail-pickup");
    assert!(pickup_files(&pickup).is_empty());
}
