use super::*;

#[test]
fn reindex_writes_the_index_file() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");
    ctx.migrate(&config);

    ctx.gantry()
        .arg("reindex")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Search index rebuilt: 0 package(s)"));

    assert!(ctx.root().join("index").join("packages.json").is_file());
}

#[test]
fn reindex_refuses_external_search() {
    let ctx = TestContext::new();
    let config =
        ctx.write_config("search:\n  service_discovery_uri: https://search.example.com\n");

    ctx.gantry()
        .arg("reindex")
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("external"));
}
