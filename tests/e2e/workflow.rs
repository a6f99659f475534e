use super::*;
use gantry::db::GalleryDb;

/// Full operator pass over one gallery: migrate, seed, reindex, stats.
#[test]
fn migrate_seed_reindex_stats() {
    let ctx = TestContext::new();
    let config = ctx.write_config("");
    ctx.migrate(&config);

    // Seed the catalog the way the gallery's write path would
    let db = GalleryDb::open(&ctx.root().join("gallery.db")).unwrap();
    db.create_package("acme.widgets", "Widget toolkit", &[])
        .unwrap();
    db.add_version("acme.widgets", "1.0.0").unwrap();
    db.add_version("acme.widgets", "1.1.0").unwrap();
    db.record_downloads("acme.widgets", 41).unwrap();
    drop(db);

    ctx.gantry()
        .arg("reindex")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Search index rebuilt: 1 package(s)"));

    let index = std::fs::read_to_string(ctx.root().join("index").join("packages.json")).unwrap();
    assert!(index.contains("acme.widgets"));

    ctx.gantry()
        .arg("stats")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("unique packages:   1"))
        .stdout(predicate::str::contains("package versions:  2"))
        .stdout(predicate::str::contains("total downloads:   41"));
}
