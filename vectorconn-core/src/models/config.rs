//! Connection configuration model
//!
//! A `ConnectionConfig` is an unordered set of key/value pairs describing the
//! target of a connection. Equality is set-equality over the pairs, so two
//! configurations built with their keys in a different order compare equal.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key holding the server host
pub const HOST_KEY: &str = "host";

/// Key holding the server port
pub const PORT_KEY: &str = "port";

/// Keys that must be present before a connection can be established
pub const REQUIRED_KEYS: [&str; 2] = [HOST_KEY, PORT_KEY];

/// Key/value configuration of a connection alias
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionConfig {
    params: BTreeMap<String, String>,
}

impl ConnectionConfig {
    /// Creates a configuration with the given host and port
    #[must_use]
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.insert(HOST_KEY, host);
        config.insert(PORT_KEY, port);
        config
    }

    /// Creates an empty configuration
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets a parameter, returning the previous value if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the configured host
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.get(HOST_KEY)
    }

    /// Returns the configured port, as written
    #[must_use]
    pub fn port(&self) -> Option<&str> {
        self.get(PORT_KEY)
    }

    /// Returns the required keys this configuration lacks
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .into_iter()
            .filter(|key| !self.params.contains_key(*key))
            .collect()
    }

    /// Returns a copy of `self` with every key of `overrides` applied on top
    #[must_use]
    pub fn merged_with(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        merged.params.extend(
            overrides
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }

    /// Returns true if no parameters are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterates over the parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ConnectionConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ConnectionConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for ConnectionConfig {
    fn from(params: BTreeMap<String, String>) -> Self {
        Self { params }
    }
}

impl From<ConnectionConfig> for BTreeMap<String, String> {
    fn from(config: ConnectionConfig) -> Self {
        config.params
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{key}': '{value}'")?;
        }
        f.write_str("}")
    }
}
