//! Core traits and types for secret storage

use std::collections::BTreeMap;

use thiserror::Error;

use super::service::ServiceKey;

/// Opaque status code reported by a backend
pub type StatusCode = i32;

/// Status codes used by the built-in backends
///
/// Values follow the platform keychain conventions so that a code surfaced
/// from the memory backend reads the same as one from the real keychain.
pub mod codes {
    use super::StatusCode;

    pub const STATUS_SUCCESS: StatusCode = 0;
    pub const STATUS_PARAM: StatusCode = -50;
    pub const STATUS_NOT_AVAILABLE: StatusCode = -25291;
    pub const STATUS_DUPLICATE_ITEM: StatusCode = -25299;
    pub const STATUS_ITEM_NOT_FOUND: StatusCode = -25300;
    pub const STATUS_INTERACTION_NOT_ALLOWED: StatusCode = -25308;
    pub const STATUS_INTERNAL: StatusCode = -26276;
}

/// Outcome of a single backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status<T> {
    Success(T),
    NotFound,
    Other(StatusCode),
}

impl<T> Status<T> {
    /// Numeric code for this outcome
    pub fn code(&self) -> StatusCode {
        match self {
            Status::Success(_) => codes::STATUS_SUCCESS,
            Status::NotFound => codes::STATUS_ITEM_NOT_FOUND,
            Status::Other(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success(_))
    }

    /// Treat not-found as an absent value; everything else unknown is an error
    pub fn found(self) -> StoreResult<Option<T>> {
        match self {
            Status::Success(value) => Ok(Some(value)),
            Status::NotFound => Ok(None),
            Status::Other(code) => Err(StoreError::Unknown(code)),
        }
    }

    /// Require success; not-found is reported as an unknown status
    pub fn succeeded(self) -> StoreResult<T> {
        match self {
            Status::Success(value) => Ok(value),
            other => Err(StoreError::Unknown(other.code())),
        }
    }
}

/// An entry as held by the backend
///
/// `payload` is `None` when the backend matched an item but returned no data
/// for it. `attributes` is backend metadata and is never interpreted by the
/// facade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreEntry {
    pub payload: Option<Vec<u8>>,
    pub attributes: BTreeMap<String, String>,
}

impl StoreEntry {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Some(payload.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// An entry that matched but carries no payload
    pub fn without_payload() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Errors surfaced by the secret store facade
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend returned a status other than success or not-found
    #[error("Secret store returned unexpected status {0}")]
    Unknown(StatusCode),

    /// A stored payload could not be decoded as UTF-8
    #[error("Stored item is not a valid UTF-8 string")]
    UnexpectedFormat,
}

impl StoreError {
    /// The backend status, for `Unknown`
    pub fn code(&self) -> Option<StatusCode> {
        match self {
            StoreError::Unknown(code) => Some(*code),
            StoreError::UnexpectedFormat => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Capability exposed by a platform secret store
///
/// Implementations:
/// - OS keychain (`KeychainBackend`)
/// - In-memory for testing (`MemoryBackend`)
///
/// Every call is a single blocking round-trip. Implementations must not cache
/// payloads between calls.
pub trait SecretBackend: Send + Sync {
    /// Human-readable name of this backend
    fn name(&self) -> &str;

    /// Check if this backend can be reached
    ///
    /// For example, the keychain might not be available on a headless server.
    fn is_available(&self) -> bool {
        true
    }

    /// Fetch the entry for `key`, at most one match
    fn lookup(&self, key: &ServiceKey) -> Status<StoreEntry>;

    /// Replace the payload of an existing entry
    fn update(&self, key: &ServiceKey, payload: &[u8]) -> Status<()>;

    /// Insert a new entry
    ///
    /// Fails with [`codes::STATUS_DUPLICATE_ITEM`] if an entry already exists.
    fn create(&self, key: &ServiceKey, payload: &[u8]) -> Status<()>;

    /// Remove the entry for `key`
    fn delete(&self, key: &ServiceKey) -> Status<()>;

    /// Insert or replace in a single call
    ///
    /// Returns `None` when the backend has no such call, in which case the
    /// caller checks for an entry and then updates or creates.
    fn upsert(&self, _key: &ServiceKey, _payload: &[u8]) -> Option<Status<()>> {
        None
    }
}
