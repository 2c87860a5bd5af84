//! Secret storage facade and backends
//!
//! This module provides:
//! - `SecretStore`, the read/write/delete facade callers use
//! - `SecretBackend` trait for plugging in a platform secret store
//! - Built-in backends: `KeychainBackend`, `MemoryBackend`
//! - A registry for discovering and creating backends by name

mod service;
mod traits;
mod facade;
mod memory_store;
mod keychain_store;
mod registry;

pub use service::{ServiceKey, ServiceKeyError};
pub use traits::{codes, SecretBackend, Status, StatusCode, StoreEntry, StoreError, StoreResult};
pub use facade::SecretStore;
pub use memory_store::{MemoryBackend, Operation};
pub use keychain_store::{KeychainBackend, DEFAULT_ACCOUNT};
pub use registry::{
    create_backend, create_backend_with, has_backend, list_backends, register_backend,
    unregister_backend, BackendDefinition, BackendFactory,
};
