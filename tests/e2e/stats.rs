use super::*;

#[test]
fn stats_reports_totals_for_an_empty_gallery() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");
    ctx.migrate(&config);

    ctx.gantry()
        .arg("stats")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Gallery statistics"))
        .stdout(predicate::str::contains("unique packages:   0"))
        .stdout(predicate::str::contains("total downloads:   0"));
}

#[test]
fn stats_fails_before_migrate() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");

    ctx.gantry()
        .arg("stats")
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("❌"));
}
