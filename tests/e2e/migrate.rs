use super::*;

#[test]
fn migrate_creates_the_database() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");

    ctx.gantry()
        .arg("migrate")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Gallery schema is up to date"));

    assert!(ctx.root().join("gallery.db").is_file());
}

#[test]
fn migrate_twice_succeeds() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");

    ctx.migrate(&config);
    ctx.gantry()
        .arg("migrate")
        .arg("-c")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn migrate_honors_a_configured_database_path() {
    let ctx = TestContext::new();
    let db_path = ctx.temp.child("elsewhere").child("catalog.db").to_path_buf();
    let config = ctx.write_config(&format!("database:\n  path: {}\n", db_path.display()));

    ctx.gantry()
        .arg("migrate")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("catalog.db"));

    assert!(db_path.is_file());
}
