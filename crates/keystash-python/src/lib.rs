//! Python bindings for Keystash via PyO3

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use keystash_core::config::{load_store_config, StoreConfig};
use keystash_core::secrets::{
    list_backends as core_list_backends,
    SecretStore as CoreSecretStore,
    ServiceKey,
    StoreError,
};

create_exception!(keystash, KeychainError, PyException);
create_exception!(keystash, UnknownStatusError, KeychainError);
create_exception!(keystash, UnexpectedFormatError, KeychainError);

fn service_key(key: &str) -> PyResult<ServiceKey> {
    ServiceKey::new(key).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn store_error(err: StoreError) -> PyErr {
    match err {
        StoreError::Unknown(code) => UnknownStatusError::new_err((err.to_string(), code)),
        StoreError::UnexpectedFormat => UnexpectedFormatError::new_err(err.to_string()),
    }
}

#[pyclass]
#[derive(Clone)]
pub struct BackendInfo {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub description: String,
}

#[pymethods]
impl BackendInfo {
    fn __repr__(&self) -> String {
        format!("BackendInfo(name='{}', description='{}')", self.name, self.description)
    }
}

// ============================================================================
// SecretStore
// ============================================================================

/// Secret store backed by the system keychain or another registered backend
#[pyclass]
pub struct SecretStore {
    inner: CoreSecretStore,
}

impl SecretStore {
    fn from_store_config(config: &StoreConfig) -> PyResult<Self> {
        let inner = CoreSecretStore::from_config(config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[pymethods]
impl SecretStore {
    #[new]
    #[pyo3(signature = (backend=None, account=None))]
    pub fn new(backend: Option<&str>, account: Option<&str>) -> PyResult<Self> {
        let mut config = StoreConfig::default();
        if let Some(backend) = backend {
            config.backend = backend.to_string();
        }
        config.account = account.map(str::to_string);
        Self::from_store_config(&config)
    }

    /// Build a store from the user config file and environment overrides
    #[staticmethod]
    pub fn from_user_config() -> PyResult<Self> {
        let config = load_store_config().map_err(|e| PyValueError::new_err(e.to_string()))?;
        Self::from_store_config(&config)
    }

    #[getter]
    pub fn backend(&self) -> String { self.inner.backend_name().to_string() }

    pub fn read<'py>(&self, py: Python<'py>, key: &str) -> PyResult<Option<Bound<'py, PyBytes>>> {
        let bytes = self.inner.read(&service_key(key)?).map_err(store_error)?;
        Ok(bytes.map(|b| PyBytes::new(py, &b)))
    }

    pub fn read_string(&self, key: &str) -> PyResult<Option<String>> {
        self.inner.read_string(&service_key(key)?).map_err(store_error)
    }

    pub fn write(&self, key: &str, payload: &[u8]) -> PyResult<()> {
        self.inner.write(&service_key(key)?, payload).map_err(store_error)
    }

    pub fn write_string(&self, key: &str, value: &str) -> PyResult<()> {
        self.inner.write_string(&service_key(key)?, value).map_err(store_error)
    }

    pub fn delete(&self, key: &str) -> PyResult<()> {
        self.inner.delete(&service_key(key)?).map_err(store_error)
    }

    pub fn exists(&self, key: &str) -> bool {
        service_key(key).map(|k| self.inner.exists(&k)).unwrap_or(false)
    }

    pub fn exists_string(&self, key: &str) -> bool {
        service_key(key).map(|k| self.inner.exists_string(&k)).unwrap_or(false)
    }

    fn __contains__(&self, key: &str) -> bool {
        self.exists(key)
    }

    fn __repr__(&self) -> String {
        format!("SecretStore(backend='{}')", self.inner.backend_name())
    }
}

#[pyfunction]
fn list_backends() -> Vec<BackendInfo> {
    core_list_backends()
        .into_iter()
        .map(|(name, description)| BackendInfo { name, description })
        .collect()
}

#[pymodule]
fn keystash(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<BackendInfo>()?;
    m.add_class::<SecretStore>()?;

    m.add("KeychainError", m.py().get_type::<KeychainError>())?;
    m.add("UnknownStatusError", m.py().get_type::<UnknownStatusError>())?;
    m.add("UnexpectedFormatError", m.py().get_type::<UnexpectedFormatError>())?;

    m.add_function(wrap_pyfunction!(list_backends, m)?)?;

    Ok(())
}
