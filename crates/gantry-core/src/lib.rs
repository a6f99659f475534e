pub mod core;

pub use crate::core::error::{GantryError, GantryResult};
pub use crate::core::path;
pub use crate::core::secrets::SecretStore;
