//! Keystash Core
//!
//! A small facade for keeping secrets (strings or byte blobs) in the platform
//! keychain. Encryption, persistence and access control belong to the
//! keychain; this crate builds the requests and interprets the results.
//! Language bindings (Node.js via napi-rs, Python via PyO3) wrap this crate.
//!
//! ```rust
//! use keystash_core::{SecretStore, ServiceKey};
//!
//! let store = SecretStore::memory();
//! let key = ServiceKey::new("com.example.refresh-token").unwrap();
//!
//! assert_eq!(store.read(&key).unwrap(), None);
//! store.write(&key, b"opaque bytes").unwrap();
//! assert!(store.exists(&key));
//! ```

pub mod secrets;
pub mod config;

pub use secrets::{
    SecretStore, ServiceKey, ServiceKeyError,
    SecretBackend, Status, StatusCode, StoreEntry, StoreError, StoreResult,
    KeychainBackend, MemoryBackend,
    register_backend, create_backend, list_backends,
};

pub use config::{ConfigError, ConfigResult, ConfigFile, FileConfig, StoreConfig, load_store_config};
