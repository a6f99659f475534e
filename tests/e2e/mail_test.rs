use super::*;

#[test]
fn mail_test_writes_a_pickup_file() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");

    ctx.gantry()
        .arg("mail-test")
        .arg("--to")
        .arg("operator@example.com")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Test message for operator@example.com"));

    let pickup = ctx.root().join("mail-pickup");
    let files: Vec<_> = std::fs::read_dir(&pickup)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(files.len(), 1);
    let eml = std::fs::read_to_string(files[0].path()).unwrap();
    assert!(eml.contains("To: operator@example.com"));
    assert!(eml.contains("Subject: [Gantry Gallery] Mail delivery test"));
}

#[test]
fn mail_test_rejects_a_bad_recipient() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");

    ctx.gantry()
        .arg("mail-test")
        .arg("--to")
        .arg("not-an-address")
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a usable recipient address"));
}
