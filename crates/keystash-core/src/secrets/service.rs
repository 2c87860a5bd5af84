//! Service identifiers for stored secrets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a [`ServiceKey`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceKeyError {
    #[error("Service key must not be empty")]
    Empty,
}

/// An opaque name for one secret in the backing store
///
/// The secret itself is usually a string as well, so the name gets its own
/// type to keep the two from being swapped at a call site. Two keys are equal
/// iff their names are equal.
///
/// # Example
///
/// ```
/// use keystash_core::secrets::ServiceKey;
///
/// let key = ServiceKey::new("com.example.api-token").unwrap();
/// assert_eq!(key.as_str(), "com.example.api-token");
/// assert!(ServiceKey::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceKey(String);

impl ServiceKey {
    /// Create a service key, rejecting empty names
    pub fn new(name: impl Into<String>) -> Result<Self, ServiceKeyError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ServiceKeyError::Empty);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServiceKey {
    type Err = ServiceKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ServiceKey {
    type Error = ServiceKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ServiceKey {
    type Error = ServiceKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceKey> for String {
    fn from(key: ServiceKey) -> Self {
        key.0
    }
}
