//! Integration tests exercising the gallery services through the
//! composition root.

use std::path::Path;
use std::sync::Arc;

use gantry::config::{AppConfiguration, ConfigurationService};
use gantry::di::ServiceContainer;

mod container_flow;
mod mail_flow;
mod search_flow;

/// Build a container from an in-memory snapshot.
pub fn build(config: AppConfiguration) -> ServiceContainer {
    ServiceContainer::build(Arc::new(ConfigurationService::from_snapshot(config))).unwrap()
}

/// A file-system gallery rooted under `dir`.
pub fn file_system_container(dir: &Path) -> ServiceContainer {
    build(file_system_config(dir))
}

pub fn file_system_config(dir: &Path) -> AppConfiguration {
    let mut config = AppConfiguration::default();
    config.storage.directory = Some(dir.join("gallery").to_string_lossy().into_owned());
    config
}
