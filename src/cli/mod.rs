//! CLI command implementations

pub mod check;
pub mod migrate;
pub mod reindex;
pub mod secret;
pub mod stats;
