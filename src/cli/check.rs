use gantry::config::{AppConfiguration, ConfigurationService};
use gantry::core::{GantryError, GantryResult};
use gantry::di::{ServiceContainer, StorageBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn run(config_path: Option<PathBuf>) -> GantryResult<()> {
    println!("Checking gallery configuration...");
    println!();

    let config = match load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("  ❌ {}", e);
            return Err(GantryError::CheckFailed(
                "configuration did not validate".to_string(),
            ));
        }
    };
    println!("  ✓ Configuration loaded: {}", config.path().display());

    let container = match ServiceContainer::build(Arc::new(config)) {
        Ok(container) => container,
        Err(e) => {
            println!("  ❌ {}", e);
            return Err(GantryError::CheckFailed(
                "service container could not be built".to_string(),
            ));
        }
    };
    println!("  ✓ Service container built");
    println!();

    print_summary(&container)
}

fn load(config_path: Option<&Path>) -> GantryResult<ConfigurationService> {
    match config_path {
        Some(path) => ConfigurationService::load_from(path),
        None => ConfigurationService::load(),
    }
}

fn print_summary(container: &ServiceContainer) -> GantryResult<()> {
    let snapshot = container.config.current();

    println!(
        "Gallery: {} <{}>",
        snapshot.gallery.display_name, snapshot.gallery.owner_address
    );
    println!("Site:    {}", snapshot.gallery.site_root);
    println!();
    println!("Selected backends:");
    println!("  storage:       {}", container.selection.storage);
    println!("  search:        {}", container.selection.search);
    println!("  autocomplete:  {}", container.selection.autocomplete);
    println!("  error log:     {}", container.selection.error_log);
    println!("  mail:          {}", mail_mode(&snapshot));
    println!();

    println!("Paths:");
    println!("  database:      {}", snapshot.database_path()?.display());
    if container.selection.storage == StorageBackend::FileSystem {
        println!("  storage root:  {}", snapshot.storage_root()?.display());
    }
    if mail_mode(&snapshot) == "pickup-directory" {
        println!(
            "  mail pickup:   {}",
            snapshot.mail_pickup_directory()?.display()
        );
    }

    Ok(())
}

fn mail_mode(snapshot: &AppConfiguration) -> &'static str {
    match snapshot.mail.relay_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => "http-relay",
        _ => "pickup-directory",
    }
}
