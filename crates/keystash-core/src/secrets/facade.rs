//! Read/write/delete facade over a secret backend

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::memory_store::MemoryBackend;
use super::registry::create_backend_with;
use super::service::ServiceKey;
use super::traits::{SecretBackend, Status, StoreError, StoreResult};
use crate::config::{ConfigError, ConfigResult, StoreConfig};

/// Secret storage facade
///
/// Translates string- and byte-oriented calls into backend requests and maps
/// backend statuses onto [`StoreError`]. Keeps no state between calls; every
/// read goes back to the backend.
///
/// # Example
///
/// ```
/// use keystash_core::secrets::{SecretStore, ServiceKey};
///
/// let store = SecretStore::memory();
/// let key = ServiceKey::new("service").unwrap();
///
/// store.write_string(&key, "foo").unwrap();
/// assert_eq!(store.read_string(&key).unwrap().as_deref(), Some("foo"));
///
/// store.delete(&key).unwrap();
/// assert!(!store.exists(&key));
/// ```
#[derive(Clone)]
pub struct SecretStore {
    backend: Arc<dyn SecretBackend>,
}

impl SecretStore {
    pub fn new(backend: Arc<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    /// A store over a fresh [`MemoryBackend`]
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Build a store from configuration, looking the backend up by name
    pub fn from_config(config: &StoreConfig) -> ConfigResult<Self> {
        create_backend_with(&config.backend, config)
            .map(Self::new)
            .ok_or_else(|| ConfigError::UnknownBackend(config.backend.clone()))
    }

    pub fn backend(&self) -> &Arc<dyn SecretBackend> {
        &self.backend
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Read the payload stored under `key`
    ///
    /// Returns `Ok(None)` if nothing is stored. An entry the backend matched
    /// but returned without data also reads as `Ok(None)`.
    pub fn read(&self, key: &ServiceKey) -> StoreResult<Option<Vec<u8>>> {
        trace!(service = %key, "read");
        match self.backend.lookup(key).found()? {
            Some(entry) => {
                if entry.payload.is_none() {
                    debug!(service = %key, "item found without data");
                }
                Ok(entry.payload)
            }
            None => Ok(None),
        }
    }

    /// Read the payload stored under `key` as a UTF-8 string
    ///
    /// Fails with [`StoreError::UnexpectedFormat`] if the payload is not UTF-8.
    pub fn read_string(&self, key: &ServiceKey) -> StoreResult<Option<String>> {
        match self.read(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::UnexpectedFormat),
            None => Ok(None),
        }
    }

    /// Store `payload` under `key`, replacing whatever is there
    ///
    /// Backends without a native upsert get a check followed by an update or
    /// a create. The pair is not atomic: a concurrent writer or deleter on the
    /// same key can make the second call fail, which surfaces as
    /// [`StoreError::Unknown`].
    pub fn write(&self, key: &ServiceKey, payload: &[u8]) -> StoreResult<()> {
        if let Some(status) = self.backend.upsert(key, payload) {
            trace!(service = %key, "upsert");
            return status.succeeded();
        }

        // Any entry counts here, UTF-8 or not
        let status = if self.exists(key) {
            debug!(service = %key, "updating existing item");
            self.backend.update(key, payload)
        } else {
            debug!(service = %key, "creating new item");
            self.backend.create(key, payload)
        };
        status.succeeded()
    }

    /// Store `value` under `key` as UTF-8
    pub fn write_string(&self, key: &ServiceKey, value: &str) -> StoreResult<()> {
        self.write(key, value.as_bytes())
    }

    /// Remove the entry for `key`; succeeds if there was none
    pub fn delete(&self, key: &ServiceKey) -> StoreResult<()> {
        match self.backend.delete(key) {
            Status::Success(()) => {
                debug!(service = %key, "deleted");
                Ok(())
            }
            Status::NotFound => Ok(()),
            Status::Other(code) => Err(StoreError::Unknown(code)),
        }
    }

    /// Check if any payload is stored under `key`; errors read as `false`
    pub fn exists(&self, key: &ServiceKey) -> bool {
        matches!(self.read(key), Ok(Some(_)))
    }

    /// Check if a UTF-8 payload is stored under `key`; errors read as `false`
    pub fn exists_string(&self, key: &ServiceKey) -> bool {
        matches!(self.read_string(key), Ok(Some(_)))
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::memory_store::Operation;
    use crate::secrets::traits::{codes, StoreEntry};

    fn key(name: &str) -> ServiceKey {
        ServiceKey::new(name).unwrap()
    }

    fn store_with(backend: &Arc<MemoryBackend>) -> SecretStore {
        SecretStore::new(backend.clone())
    }

    #[test]
    fn test_write_creates_then_updates() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        let k = key("service");

        store.write(&k, &[1]).unwrap();
        assert_eq!(backend.calls(Operation::Create), 1);
        assert_eq!(backend.calls(Operation::Update), 0);

        store.write(&k, &[2]).unwrap();
        assert_eq!(backend.calls(Operation::Create), 1);
        assert_eq!(backend.calls(Operation::Update), 1);
        assert_eq!(backend.len(), 1);
        assert_eq!(store.read(&k).unwrap(), Some(vec![2]));
    }

    #[test]
    fn test_write_prefers_native_upsert() {
        let backend = Arc::new(MemoryBackend::with_upsert());
        let store = store_with(&backend);
        let k = key("service");

        store.write(&k, b"a").unwrap();
        store.write(&k, b"b").unwrap();

        assert_eq!(backend.calls(Operation::Upsert), 2);
        assert_eq!(backend.calls(Operation::Lookup), 0);
        assert_eq!(backend.calls(Operation::Create), 0);
        assert_eq!(store.read(&k).unwrap(), Some(b"b".to_vec()));
    }

    #[test]
    fn test_write_updates_non_utf8_entry() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        let k = key("binary");

        store.write(&k, &[0xff, 0xfe]).unwrap();
        store.write_string(&k, "text").unwrap();

        assert_eq!(backend.calls(Operation::Update), 1);
        assert_eq!(store.read_string(&k).unwrap().as_deref(), Some("text"));
    }

    #[test]
    fn test_read_unknown_status() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        backend.fail_next(Operation::Lookup, codes::STATUS_INTERACTION_NOT_ALLOWED);

        assert_eq!(
            store.read(&key("k")),
            Err(StoreError::Unknown(codes::STATUS_INTERACTION_NOT_ALLOWED))
        );
    }

    #[test]
    fn test_read_entry_without_payload_is_absent() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        let k = key("bare");
        backend.insert_entry(k.clone(), StoreEntry::without_payload());

        assert_eq!(store.read(&k), Ok(None));
        assert_eq!(store.read_string(&k), Ok(None));
        assert!(!store.exists(&k));
    }

    #[test]
    fn test_write_create_failure() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        backend.fail_next(Operation::Create, codes::STATUS_NOT_AVAILABLE);

        assert_eq!(
            store.write(&key("k"), b"v"),
            Err(StoreError::Unknown(codes::STATUS_NOT_AVAILABLE))
        );
        assert!(backend.is_empty());
    }

    #[test]
    fn test_write_update_failure() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        let k = key("k");
        store.write(&k, b"v1").unwrap();
        backend.fail_next(Operation::Update, codes::STATUS_INTERNAL);

        assert_eq!(
            store.write(&k, b"v2"),
            Err(StoreError::Unknown(codes::STATUS_INTERNAL))
        );
        assert_eq!(store.read(&k).unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn test_write_update_not_found_is_unknown() {
        // Item deleted between the existence check and the update
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        let k = key("k");
        store.write(&k, b"v1").unwrap();
        backend.miss_next(Operation::Update);

        assert_eq!(
            store.write(&k, b"v2"),
            Err(StoreError::Unknown(codes::STATUS_ITEM_NOT_FOUND))
        );
        assert_eq!(backend.calls(Operation::Update), 1);
        assert_eq!(backend.calls(Operation::Create), 1);
        assert_eq!(store.read(&k).unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn test_write_create_not_found_is_unknown() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        backend.miss_next(Operation::Create);

        assert_eq!(
            store.write(&key("k"), b"v"),
            Err(StoreError::Unknown(codes::STATUS_ITEM_NOT_FOUND))
        );
        assert!(backend.is_empty());
    }

    #[test]
    fn test_write_upsert_not_found_is_unknown() {
        let backend = Arc::new(MemoryBackend::with_upsert());
        let store = store_with(&backend);
        backend.miss_next(Operation::Upsert);

        assert_eq!(
            store.write(&key("k"), b"v"),
            Err(StoreError::Unknown(codes::STATUS_ITEM_NOT_FOUND))
        );
    }

    #[test]
    fn test_write_check_failure_falls_through_to_create() {
        // A failed existence check reads as "absent", so write tries create
        // and the duplicate-item status comes back from the backend.
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        let k = key("k");
        store.write(&k, b"v1").unwrap();
        backend.fail_next(Operation::Lookup, codes::STATUS_INTERNAL);

        assert_eq!(
            store.write(&k, b"v2"),
            Err(StoreError::Unknown(codes::STATUS_DUPLICATE_ITEM))
        );
    }

    #[test]
    fn test_delete_unknown_status() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        backend.fail_next(Operation::Delete, -1);

        assert_eq!(store.delete(&key("k")), Err(StoreError::Unknown(-1)));
    }

    #[test]
    fn test_exists_swallows_errors() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(&backend);
        let k = key("k");
        store.write(&k, b"v").unwrap();

        backend.fail_next(Operation::Lookup, -1);
        assert!(!store.exists(&k));
        backend.fail_next(Operation::Lookup, -1);
        assert!(!store.exists_string(&k));

        assert!(store.exists(&k));
        assert!(store.exists_string(&k));
    }

    #[test]
    fn test_exists_string_requires_utf8() {
        let store = SecretStore::memory();
        let k = key("k");
        store.write(&k, &[0xc3, 0x28]).unwrap();

        assert!(store.exists(&k));
        assert!(!store.exists_string(&k));
    }

    #[test]
    fn test_debug_and_name() {
        let store = SecretStore::memory();
        assert_eq!(store.backend_name(), "memory");
        assert_eq!(format!("{:?}", store), "SecretStore { backend: \"memory\" }");
    }
}
