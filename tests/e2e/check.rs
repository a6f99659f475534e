use super::*;

#[test]
fn check_reports_file_system_defaults() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");

    ctx.gantry()
        .arg("check")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected backends:"))
        .stdout(predicate::str::contains("storage:       file-system"))
        .stdout(predicate::str::contains("search:        local"))
        .stdout(predicate::str::contains("autocomplete:  local"))
        .stdout(predicate::str::contains("error log:     sql"))
        .stdout(predicate::str::contains("mail:          pickup-directory"));
}

#[test]
fn check_reports_cloud_backends() {
    let ctx = TestContext::new();
    let config = ctx.write_config(
        "  kind: cloud\n  connection_string: \"endpoint=https://blobs.example.com;key=QUJDREVG\"\n\
         search:\n  service_discovery_uri: https://search.example.com\n  autocomplete_resource_type: autocomplete/1.0\n\
         mail:\n  relay_url: https://relay.example.com/send\n",
    );

    ctx.gantry()
        .arg("check")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("storage:       cloud"))
        .stdout(predicate::str::contains("search:        external"))
        .stdout(predicate::str::contains("autocomplete:  service"))
        .stdout(predicate::str::contains("error log:     cloud-table"))
        .stdout(predicate::str::contains("mail:          http-relay"));
}

#[test]
fn check_rejects_invalid_configuration() {
    let ctx = TestContext::new();
    let config = ctx.write_config("  checksum_algorithm: md5\n");

    ctx.gantry()
        .arg("check")
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("❌"))
        .stderr(predicate::str::contains("Configuration check failed"));
}

#[test]
fn check_creates_a_default_config_on_first_run() {
    let ctx = TestContext::new();
    let config = ctx.temp.child("fresh").child("gallery.yaml").to_path_buf();

    // The default configuration roots storage in the platform data
    // dir, which the harness points into the temp dir.
    ctx.gantry()
        .arg("check")
        .arg("-c")
        .arg(&config)
        .assert()
        .success();

    assert!(config.is_file());
    let yaml = std::fs::read_to_string(&config).unwrap();
    assert!(yaml.contains("display_name"));
}
