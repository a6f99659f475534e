pub mod error;
pub mod path;
pub mod secrets;

pub use error::{GantryError, GantryResult};
pub use secrets::SecretStore;
