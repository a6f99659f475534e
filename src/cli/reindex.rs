use gantry::core::{GantryError, GantryResult};
use gantry::di::{bootstrap, SearchBackend};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

pub async fn run(config_path: Option<PathBuf>) -> GantryResult<()> {
    let container = bootstrap(config_path.as_deref())?;

    if container.selection.search == SearchBackend::External {
        return Err(GantryError::Search(
            "search is delegated to an external service; there is no local index to rebuild"
                .to_string(),
        ));
    }

    let packages = container.db.packages_for_index()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Indexing {} package(s)...", packages.len()));

    container.indexing.rebuild_index().await?;

    pb.finish_and_clear();
    println!("✓ Search index rebuilt: {} package(s)", packages.len());
    if let Some(updated) = container.indexing.last_updated().await? {
        println!("  last updated: {}", updated.to_rfc3339());
    }

    Ok(())
}
