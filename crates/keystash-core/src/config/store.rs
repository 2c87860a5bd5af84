//! Store selection settings

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`StoreConfig::backend`]
pub const ENV_BACKEND: &str = "KEYSTASH_BACKEND";

/// Environment variable overriding [`StoreConfig::account`]
pub const ENV_ACCOUNT: &str = "KEYSTASH_ACCOUNT";

fn default_backend() -> String {
    "keychain".to_string()
}

/// Which backend a [`SecretStore`](crate::secrets::SecretStore) talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Registered backend name ("keychain", "memory", or a custom one)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Keychain account that namespaces this application's items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            account: None,
        }
    }
}

impl StoreConfig {
    /// Settings for the in-memory backend
    pub fn memory() -> Self {
        Self {
            backend: "memory".to_string(),
            account: None,
        }
    }

    /// Apply `KEYSTASH_BACKEND` / `KEYSTASH_ACCOUNT` from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_vars(std::env::vars())
    }

    /// Apply overrides from an explicit set of variables
    ///
    /// Empty values are ignored.
    pub fn apply_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let value = value.into();
            if value.is_empty() {
                continue;
            }
            match name.as_ref() {
                ENV_BACKEND => self.backend = value,
                ENV_ACCOUNT => self.account = Some(value),
                _ => {}
            }
        }
        self
    }
}
