//! Backend registry for discovering and creating secret backends by name

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::keychain_store::{KeychainBackend, DEFAULT_ACCOUNT};
use super::memory_store::MemoryBackend;
use super::traits::SecretBackend;
use crate::config::StoreConfig;

/// Factory function type for creating backends from configuration
pub type BackendFactory = Box<dyn Fn(&StoreConfig) -> Arc<dyn SecretBackend> + Send + Sync>;

/// Definition of a registered backend
pub struct BackendDefinition {
    /// Unique name for this backend
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: BackendFactory,
}

impl std::fmt::Debug for BackendDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Global registry of backends
static REGISTRY: Lazy<RwLock<HashMap<String, BackendDefinition>>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert(
        "memory".to_string(),
        BackendDefinition {
            name: "memory".to_string(),
            description: "In-memory storage for testing".to_string(),
            factory: Box::new(|_| Arc::new(MemoryBackend::new())),
        },
    );

    map.insert(
        "keychain".to_string(),
        BackendDefinition {
            name: "keychain".to_string(),
            description: "System keychain (macOS Keychain, Windows Credential Manager, Linux Secret Service)".to_string(),
            factory: Box::new(|config| {
                let account = config.account.as_deref().unwrap_or(DEFAULT_ACCOUNT);
                Arc::new(KeychainBackend::with_account(account))
            }),
        },
    );

    RwLock::new(map)
});

/// Register a new backend type, replacing any with the same name
///
/// # Example
///
/// ```
/// use keystash_core::secrets::{register_backend, create_backend, MemoryBackend};
/// use std::sync::Arc;
///
/// register_backend(
///     "scratch",
///     "Throwaway in-memory backend",
///     Box::new(|_| Arc::new(MemoryBackend::new())),
/// );
/// assert!(create_backend("scratch").is_some());
/// ```
pub fn register_backend(name: &str, description: &str, factory: BackendFactory) {
    REGISTRY.write().insert(
        name.to_string(),
        BackendDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    );
}

/// Create a backend by name with default configuration
pub fn create_backend(name: &str) -> Option<Arc<dyn SecretBackend>> {
    create_backend_with(name, &StoreConfig::default())
}

/// Create a backend by name, passing it the given configuration
pub fn create_backend_with(name: &str, config: &StoreConfig) -> Option<Arc<dyn SecretBackend>> {
    let registry = REGISTRY.read();
    registry.get(name).map(|def| (def.factory)(config))
}

/// List all registered backends as (name, description) pairs, sorted by name
pub fn list_backends() -> Vec<(String, String)> {
    let registry = REGISTRY.read();
    let mut backends: Vec<_> = registry
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    backends.sort();
    backends
}

/// Check if a backend is registered
pub fn has_backend(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Unregister a backend (mainly for testing)
pub fn unregister_backend(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_backends_registered() {
        assert!(has_backend("memory"));
        assert!(has_backend("keychain"));
    }

    #[test]
    fn test_create_memory_backend() {
        let backend = create_backend("memory").unwrap();
        assert_eq!(backend.name(), "memory");
    }

    #[test]
    fn test_create_keychain_backend() {
        // Entry handles are created lazily, so no keychain access happens here
        let backend = create_backend("keychain").unwrap();
        assert_eq!(backend.name(), "keychain");
    }

    #[test]
    fn test_create_unknown_backend() {
        assert!(create_backend("nonexistent_xyz").is_none());
    }

    #[test]
    fn test_list_backends() {
        let backends = list_backends();
        let names: Vec<_> = backends.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"memory"));
        assert!(names.contains(&"keychain"));
    }

    #[test]
    fn test_register_custom_backend() {
        register_backend(
            "test_custom_backend",
            "A test backend",
            Box::new(|_| Arc::new(MemoryBackend::with_upsert())),
        );
        assert!(has_backend("test_custom_backend"));

        let backend = create_backend("test_custom_backend").unwrap();
        assert_eq!(backend.name(), "memory");

        assert!(unregister_backend("test_custom_backend"));
        assert!(!has_backend("test_custom_backend"));
        assert!(!unregister_backend("test_custom_backend"));
    }

    #[test]
    fn test_factory_receives_config() {
        register_backend(
            "test_config_backend",
            "Keychain with configured account",
            Box::new(|config| {
                let account = config.account.clone().unwrap_or_default();
                Arc::new(KeychainBackend::with_account(account))
            }),
        );

        let config = StoreConfig {
            backend: "test_config_backend".to_string(),
            account: Some("acct".to_string()),
        };
        let backend = create_backend_with("test_config_backend", &config).unwrap();
        assert_eq!(backend.name(), "keychain");

        unregister_backend("test_config_backend");
    }
}
