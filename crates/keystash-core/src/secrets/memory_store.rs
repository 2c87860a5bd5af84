//! In-memory secret backend

use std::collections::HashMap;

use parking_lot::RwLock;

use super::service::ServiceKey;
use super::traits::{codes, SecretBackend, Status, StatusCode, StoreEntry};

/// Backend calls, used for fault injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Lookup,
    Update,
    Create,
    Delete,
    Upsert,
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Code(StatusCode),
    Missing,
}

impl Fault {
    fn status<T>(self) -> Status<T> {
        match self {
            Fault::Code(code) => Status::Other(code),
            Fault::Missing => Status::NotFound,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<ServiceKey, StoreEntry>,
    faults: HashMap<Operation, Fault>,
    calls: HashMap<Operation, usize>,
}

impl State {
    /// Count the call and hand back an injected outcome, if one is armed
    fn begin(&mut self, op: Operation) -> Option<Fault> {
        *self.calls.entry(op).or_insert(0) += 1;
        self.faults.remove(&op)
    }
}

/// In-memory backend for testing and ephemeral use
///
/// Behaves like a platform keychain: `create` refuses to overwrite and
/// `update` refuses to insert. Entries are lost when the backend is dropped.
///
/// # Example
///
/// ```
/// use keystash_core::secrets::{MemoryBackend, SecretBackend, ServiceKey, Status};
///
/// let backend = MemoryBackend::new();
/// let key = ServiceKey::new("token").unwrap();
/// assert_eq!(backend.create(&key, b"abc"), Status::Success(()));
/// assert!(backend.lookup(&key).is_success());
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
    native_upsert: bool,
}

impl MemoryBackend {
    /// Create a new empty backend without native upsert
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that answers [`SecretBackend::upsert`] directly
    pub fn with_upsert() -> Self {
        Self {
            state: RwLock::default(),
            native_upsert: true,
        }
    }

    /// Store a raw entry, bypassing the create/update rules
    ///
    /// Useful to seed entries a well-behaved writer would never produce,
    /// such as one without a payload.
    pub fn insert_entry(&self, key: ServiceKey, entry: StoreEntry) {
        self.state.write().entries.insert(key, entry);
    }

    /// Make the next call of `op` fail with `code`
    pub fn fail_next(&self, op: Operation, code: StatusCode) {
        self.state.write().faults.insert(op, Fault::Code(code));
    }

    /// Make the next call of `op` report the item as missing, whatever is stored
    ///
    /// Stands in for another writer deleting the item between two calls.
    pub fn miss_next(&self, op: Operation) {
        self.state.write().faults.insert(op, Fault::Missing);
    }

    /// Number of times `op` has been called
    pub fn calls(&self, op: Operation) -> usize {
        self.state.read().calls.get(&op).copied().unwrap_or(0)
    }

    /// Clear all entries from the backend
    pub fn clear(&self) {
        self.state.write().entries.clear();
    }

    /// Get the number of entries in the backend
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Check if the backend is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn lookup(&self, key: &ServiceKey) -> Status<StoreEntry> {
        let mut state = self.state.write();
        if let Some(fault) = state.begin(Operation::Lookup) {
            return fault.status();
        }
        match state.entries.get(key) {
            Some(entry) => Status::Success(entry.clone()),
            None => Status::NotFound,
        }
    }

    fn update(&self, key: &ServiceKey, payload: &[u8]) -> Status<()> {
        let mut state = self.state.write();
        if let Some(fault) = state.begin(Operation::Update) {
            return fault.status();
        }
        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.payload = Some(payload.to_vec());
                Status::Success(())
            }
            None => Status::NotFound,
        }
    }

    fn create(&self, key: &ServiceKey, payload: &[u8]) -> Status<()> {
        let mut state = self.state.write();
        if let Some(fault) = state.begin(Operation::Create) {
            return fault.status();
        }
        if state.entries.contains_key(key) {
            return Status::Other(codes::STATUS_DUPLICATE_ITEM);
        }
        let entry = StoreEntry::new(payload).with_attribute("service", key.as_str());
        state.entries.insert(key.clone(), entry);
        Status::Success(())
    }

    fn delete(&self, key: &ServiceKey) -> Status<()> {
        let mut state = self.state.write();
        if let Some(fault) = state.begin(Operation::Delete) {
            return fault.status();
        }
        match state.entries.remove(key) {
            Some(_) => Status::Success(()),
            None => Status::NotFound,
        }
    }

    fn upsert(&self, key: &ServiceKey, payload: &[u8]) -> Option<Status<()>> {
        if !self.native_upsert {
            return None;
        }
        let mut state = self.state.write();
        if let Some(fault) = state.begin(Operation::Upsert) {
            return Some(fault.status());
        }
        state
            .entries
            .entry(key.clone())
            .or_insert_with(|| StoreEntry::without_payload().with_attribute("service", key.as_str()))
            .payload = Some(payload.to_vec());
        Some(Status::Success(()))
    }
}
