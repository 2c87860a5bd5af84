//! System keychain secret backend
//!
//! Uses the OS keychain for secure secret storage:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use keyring::Entry;
use parking_lot::Mutex;
use tracing::debug;

use super::service::ServiceKey;
use super::traits::{codes, SecretBackend, Status, StatusCode, StoreEntry};

/// Account name used when none is configured
pub const DEFAULT_ACCOUNT: &str = "keystash";

/// Item read by [`KeychainBackend::is_available`]; it is never written
const AVAILABILITY_CHECK: &str = "__keystash_availability_check__";

/// Secret backend over the system keychain
///
/// Each [`ServiceKey`] maps to one keychain item, stored under a shared
/// account name that namespaces one application's secrets. Item handles are
/// kept for the life of the backend; payloads never are, so every call still
/// reaches the platform store:
///
/// - **macOS**: Keychain Services (generic password)
/// - **Windows**: Credential Manager
/// - **Linux**: Secret Service API (GNOME Keyring, KWallet, etc.)
///
/// # Example
///
/// ```no_run
/// use keystash_core::secrets::{KeychainBackend, SecretStore, ServiceKey};
/// use std::sync::Arc;
///
/// let store = SecretStore::new(Arc::new(KeychainBackend::new()));
/// let key = ServiceKey::new("com.example.token").unwrap();
///
/// store.write_string(&key, "sk-...").unwrap();
/// assert_eq!(store.read_string(&key).unwrap().as_deref(), Some("sk-..."));
/// ```
pub struct KeychainBackend {
    account: String,
    entries: Mutex<HashMap<String, Arc<Entry>>>,
}

impl KeychainBackend {
    /// Create a keychain backend with the default account "keystash"
    pub fn new() -> Self {
        Self::with_account(DEFAULT_ACCOUNT)
    }

    /// Create a keychain backend storing items under a custom account
    pub fn with_account(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self, key: &ServiceKey) -> Result<Arc<Entry>, StatusCode> {
        self.entry_named(key.as_str())
    }

    fn entry_named(&self, service: &str) -> Result<Arc<Entry>, StatusCode> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(service) {
            return Ok(Arc::clone(entry));
        }
        let entry = Arc::new(Entry::new(service, &self.account).map_err(|e| status_code(&e))?);
        entries.insert(service.to_string(), Arc::clone(&entry));
        Ok(entry)
    }
}

impl fmt::Debug for KeychainBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeychainBackend")
            .field("account", &self.account)
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

impl Default for KeychainBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a keyring failure onto a keychain status code
fn status_code(err: &keyring::Error) -> StatusCode {
    let code = match err {
        keyring::Error::NoEntry => codes::STATUS_ITEM_NOT_FOUND,
        keyring::Error::NoStorageAccess(_) => codes::STATUS_NOT_AVAILABLE,
        keyring::Error::Ambiguous(_) => codes::STATUS_DUPLICATE_ITEM,
        keyring::Error::BadEncoding(_)
        | keyring::Error::TooLong(_, _)
        | keyring::Error::Invalid(_, _) => codes::STATUS_PARAM,
        _ => codes::STATUS_INTERNAL,
    };
    debug!(error = %err, code, "keychain call failed");
    code
}

fn status<T>(result: keyring::Result<T>) -> Status<T> {
    match result {
        Ok(value) => Status::Success(value),
        Err(keyring::Error::NoEntry) => Status::NotFound,
        Err(e) => Status::Other(status_code(&e)),
    }
}

impl SecretBackend for KeychainBackend {
    fn name(&self) -> &str {
        "keychain"
    }

    fn is_available(&self) -> bool {
        // Building an entry never touches the store, so read one. Headless
        // servers without a keychain daemon fail here.
        let entry = match self.entry_named(AVAILABILITY_CHECK) {
            Ok(entry) => entry,
            Err(_) => return false,
        };
        match entry.get_secret() {
            Ok(_) | Err(keyring::Error::NoEntry) => true,
            Err(e) => {
                debug!(error = %e, "keychain unavailable");
                false
            }
        }
    }

    fn lookup(&self, key: &ServiceKey) -> Status<StoreEntry> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(code) => return Status::Other(code),
        };
        match status(entry.get_secret()) {
            Status::Success(payload) => Status::Success(
                StoreEntry::new(payload)
                    .with_attribute("service", key.as_str())
                    .with_attribute("account", self.account.as_str()),
            ),
            Status::NotFound => Status::NotFound,
            Status::Other(code) => Status::Other(code),
        }
    }

    fn update(&self, key: &ServiceKey, payload: &[u8]) -> Status<()> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(code) => return Status::Other(code),
        };
        // set_secret would silently insert, so confirm the item is there first
        match status(entry.get_secret()) {
            Status::Success(_) => status(entry.set_secret(payload)),
            Status::NotFound => Status::NotFound,
            Status::Other(code) => Status::Other(code),
        }
    }

    fn create(&self, key: &ServiceKey, payload: &[u8]) -> Status<()> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(code) => return Status::Other(code),
        };
        match status(entry.get_secret()) {
            Status::Success(_) => Status::Other(codes::STATUS_DUPLICATE_ITEM),
            Status::NotFound => status(entry.set_secret(payload)),
            Status::Other(code) => Status::Other(code),
        }
    }

    fn delete(&self, key: &ServiceKey) -> Status<()> {
        match self.entry(key) {
            Ok(entry) => status(entry.delete_credential()),
            Err(code) => Status::Other(code),
        }
    }

    fn upsert(&self, key: &ServiceKey, payload: &[u8]) -> Option<Status<()>> {
        let outcome = match self.entry(key) {
            Ok(entry) => status(entry.set_secret(payload)),
            Err(code) => Status::Other(code),
        };
        Some(outcome)
    }
}
