//! Configuration for choosing and parameterizing the secret backend
//!
//! - `StoreConfig`: backend name and keychain account, with env overrides
//! - `FileConfig`: YAML file at the user config location

mod error;
mod file;
mod store;

pub use error::{ConfigError, ConfigResult};
pub use file::{load_store_config, ConfigFile, FileConfig};
pub use store::{StoreConfig, ENV_ACCOUNT, ENV_BACKEND};
