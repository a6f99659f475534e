use gantry::core::GantryResult;
use gantry::di::bootstrap;
use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>) -> GantryResult<()> {
    let container = bootstrap(config_path.as_deref())?;
    container.db.migrate()?;

    let snapshot = container.config.current();
    println!("✓ Gallery schema is up to date");
    println!("  database: {}", snapshot.database_path()?.display());

    Ok(())
}
