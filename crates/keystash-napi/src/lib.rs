//! Node.js bindings for Keystash via napi-rs

#![deny(clippy::all)]

use napi::bindgen_prelude::*;
use napi_derive::napi;

use keystash_core::config::{load_store_config, StoreConfig};
use keystash_core::secrets::{
    list_backends as core_list_backends,
    SecretStore as CoreSecretStore,
    ServiceKey,
    StoreError,
};

fn service_key(key: &str) -> Result<ServiceKey> {
    ServiceKey::new(key).map_err(|e| Error::new(Status::InvalidArg, e.to_string()))
}

fn store_error(err: StoreError) -> Error {
    match err.code() {
        Some(code) => Error::from_reason(format!("{} (code {})", err, code)),
        None => Error::from_reason(err.to_string()),
    }
}

#[napi(object)]
pub struct BackendInfo {
    pub name: String,
    pub description: String,
}

/// Secret store backed by the system keychain or another registered backend
#[napi]
pub struct SecretStore {
    inner: CoreSecretStore,
}

#[napi]
impl SecretStore {
    /// Defaults to the system keychain under the "keystash" account
    #[napi(constructor)]
    pub fn new(backend: Option<String>, account: Option<String>) -> Result<Self> {
        let mut config = StoreConfig::default();
        if let Some(backend) = backend {
            config.backend = backend;
        }
        config.account = account;
        Self::from_store_config(&config)
    }

    /// Build a store from the user config file and environment overrides
    #[napi(factory)]
    pub fn from_user_config() -> Result<Self> {
        let config = load_store_config().map_err(|e| Error::from_reason(e.to_string()))?;
        Self::from_store_config(&config)
    }

    fn from_store_config(config: &StoreConfig) -> Result<Self> {
        let inner = CoreSecretStore::from_config(config)
            .map_err(|e| Error::new(Status::InvalidArg, e.to_string()))?;
        Ok(Self { inner })
    }

    #[napi(getter)]
    pub fn backend(&self) -> String { self.inner.backend_name().to_string() }

    #[napi]
    pub fn read(&self, key: String) -> Result<Option<Buffer>> {
        let bytes = self.inner.read(&service_key(&key)?).map_err(store_error)?;
        Ok(bytes.map(Buffer::from))
    }

    #[napi]
    pub fn read_string(&self, key: String) -> Result<Option<String>> {
        self.inner.read_string(&service_key(&key)?).map_err(store_error)
    }

    #[napi]
    pub fn write(&self, key: String, payload: Buffer) -> Result<()> {
        self.inner.write(&service_key(&key)?, payload.as_ref()).map_err(store_error)
    }

    #[napi]
    pub fn write_string(&self, key: String, value: String) -> Result<()> {
        self.inner.write_string(&service_key(&key)?, &value).map_err(store_error)
    }

    #[napi]
    pub fn delete(&self, key: String) -> Result<()> {
        self.inner.delete(&service_key(&key)?).map_err(store_error)
    }

    #[napi]
    pub fn exists(&self, key: String) -> bool {
        service_key(&key).map(|k| self.inner.exists(&k)).unwrap_or(false)
    }

    #[napi]
    pub fn exists_string(&self, key: String) -> bool {
        service_key(&key).map(|k| self.inner.exists_string(&k)).unwrap_or(false)
    }
}

#[napi]
pub fn list_backends() -> Vec<BackendInfo> {
    core_list_backends()
        .into_iter()
        .map(|(name, description)| BackendInfo { name, description })
        .collect()
}
