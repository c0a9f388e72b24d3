//! Connection registry
//!
//! This module provides the `ConnectionRegistry`, which maps aliases to
//! connection configurations and live connection handles.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::{ClientSettings, ConnectSettings, DEFAULT_ALIAS};
use crate::error::{ConflictOrigin, ConnectionError, ConnectionResult};
use crate::models::{ConnectionConfig, ConnectionHandle};
use crate::transport::{Connector, Endpoint, TcpConnector};

/// Configuration of an alias and its live connection, if any
#[derive(Debug, Clone)]
struct AliasEntry {
    config: ConnectionConfig,
    handle: Option<ConnectionHandle>,
}

impl AliasEntry {
    const fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }
}

/// Registry of connection aliases
///
/// Every alias maps to one configuration and at most one live connection.
/// The registry starts with the `"default"` alias configured and is safe to
/// share between threads; all operations are serialized through one lock,
/// including the network wait inside [`connect`](Self::connect).
pub struct ConnectionRegistry {
    /// Alias entries, ordered by alias
    entries: Mutex<BTreeMap<String, AliasEntry>>,
    /// Configuration the default alias is created with
    default_config: ConnectionConfig,
    /// Factory for live connections
    connector: Arc<dyn Connector>,
    /// Upper bound on the wait for a server
    connect_timeout: Duration,
}

impl ConnectionRegistry {
    /// Creates a registry with the default alias pointing at `localhost:19530`
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&ClientSettings::default())
    }

    /// Creates a registry from client settings, connecting over TCP
    #[must_use]
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::with_connector(
            settings.default_connection.to_config(),
            Arc::new(TcpConnector::new()),
        )
        .with_connect_timeout(settings.connect.timeout())
    }

    /// Creates a registry with a custom default configuration and connector
    #[must_use]
    pub fn with_connector(default_config: ConnectionConfig, connector: Arc<dyn Connector>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            DEFAULT_ALIAS.to_string(),
            AliasEntry::new(default_config.clone()),
        );

        Self {
            entries: Mutex::new(entries),
            default_config,
            connector,
            connect_timeout: ConnectSettings::default().timeout(),
        }
    }

    /// Sets the timeout applied to every connection attempt
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the configuration the default alias is created with
    #[must_use]
    pub fn default_config(&self) -> &ConnectionConfig {
        &self.default_config
    }

    /// Returns the timeout applied to connection attempts
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, AliasEntry>> {
        // Mutations never leave the map half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Configuration ==========

    /// Stores configurations for one or more aliases
    ///
    /// Unconnected aliases are overwritten. For an alias with a live
    /// connection, a configuration equal to the connection's is accepted
    /// without change and any other configuration is rejected. The call is
    /// all-or-nothing: if any pair is rejected, nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::ConfigConflict` if an alias is already
    /// connected with a different configuration.
    pub fn add_connection<I, A>(&self, configs: I) -> ConnectionResult<()>
    where
        I: IntoIterator<Item = (A, ConnectionConfig)>,
        A: Into<String>,
    {
        let configs: Vec<(String, ConnectionConfig)> = configs
            .into_iter()
            .map(|(alias, config)| (alias.into(), config))
            .collect();

        let mut entries = self.entries();

        for (alias, config) in &configs {
            let Some(handle) = entries.get(alias).and_then(|e| e.handle.as_ref()) else {
                continue;
            };
            if handle.config() != config {
                tracing::warn!(alias = %alias, "Rejected configuration for connected alias");
                return Err(ConnectionError::ConfigConflict {
                    alias: alias.clone(),
                    origin: ConflictOrigin::AddConnection,
                    existing: handle.config().clone(),
                    requested: config.clone(),
                });
            }
        }

        for (alias, config) in configs {
            match entries.get_mut(&alias) {
                Some(entry) if entry.handle.is_some() => {}
                Some(entry) => {
                    tracing::debug!(alias = %alias, "Replaced alias configuration");
                    entry.config = config;
                }
                None => {
                    tracing::debug!(alias = %alias, "Added alias");
                    entries.insert(alias, AliasEntry::new(config));
                }
            }
        }

        Ok(())
    }

    // ========== Connection lifecycle ==========

    /// Connects an alias, returning its live connection handle
    ///
    /// The effective configuration is the alias's stored configuration with
    /// `overrides` applied on top. If the alias is already connected with the
    /// same effective configuration, the existing handle is returned.
    /// Otherwise the effective configuration is stored before the connection
    /// is attempted, so it remains visible through
    /// [`get_connection_addr`](Self::get_connection_addr) even if the attempt
    /// fails.
    ///
    /// The registry lock is held for the whole attempt. The timeout bounds
    /// each TCP connect, but host name resolution is not bounded by it, so a
    /// slow resolver blocks every other registry call until it answers.
    ///
    /// # Errors
    ///
    /// - `MissingConfig` if the alias has no configuration and `overrides` is empty
    /// - `IncompleteConfig` if the effective configuration lacks `host` or `port`
    /// - `ConfigConflict` if the alias is connected with a different configuration
    /// - `ConnectionFailed` if the server cannot be reached
    pub fn connect(
        &self,
        alias: &str,
        overrides: ConnectionConfig,
    ) -> ConnectionResult<ConnectionHandle> {
        let mut entries = self.entries();

        let effective = match entries.get(alias) {
            Some(AliasEntry {
                handle: Some(handle),
                ..
            }) => {
                let requested = handle.config().merged_with(&overrides);
                if &requested == handle.config() {
                    tracing::debug!(alias = %alias, "Reusing existing connection");
                    return Ok(handle.clone());
                }
                tracing::warn!(alias = %alias, "Connect parameters differ from live connection");
                return Err(ConnectionError::ConfigConflict {
                    alias: alias.to_string(),
                    origin: ConflictOrigin::Connect,
                    existing: handle.config().clone(),
                    requested,
                });
            }
            Some(entry) => entry.config.merged_with(&overrides),
            None if overrides.is_empty() => {
                return Err(ConnectionError::MissingConfig {
                    alias: alias.to_string(),
                });
            }
            None => overrides,
        };

        let missing = effective.missing_required();
        if !missing.is_empty() {
            return Err(ConnectionError::IncompleteConfig {
                alias: alias.to_string(),
                missing,
            });
        }

        entries
            .entry(alias.to_string())
            .and_modify(|entry| entry.config = effective.clone())
            .or_insert_with(|| AliasEntry::new(effective.clone()));

        let host = effective.host().unwrap_or_default().to_string();
        let port = effective.port().unwrap_or_default().to_string();
        let failed = |reason: String| ConnectionError::ConnectionFailed {
            alias: alias.to_string(),
            host: host.clone(),
            port: port.clone(),
            reason,
        };

        let endpoint = Endpoint::from_config(&effective).map_err(|e| failed(e.to_string()))?;

        tracing::debug!(alias = %alias, %endpoint, "Connecting");
        let transport = self
            .connector
            .establish(&endpoint, self.connect_timeout)
            .map_err(|e| {
                tracing::warn!(alias = %alias, %endpoint, error = %e, "Connection failed");
                failed(e.to_string())
            })?;

        let handle = ConnectionHandle::new(alias.to_string(), effective, transport);
        if let Some(entry) = entries.get_mut(alias) {
            entry.handle = Some(handle.clone());
        }
        tracing::info!(alias = %alias, %endpoint, id = %handle.id(), "Connected");

        Ok(handle)
    }

    /// Closes the live connection of an alias, keeping its configuration
    ///
    /// Does nothing if the alias is unknown or not connected.
    pub fn disconnect(&self, alias: &str) {
        let handle = self
            .entries()
            .get_mut(alias)
            .and_then(|entry| entry.handle.take());

        if let Some(handle) = handle {
            handle.close();
            tracing::info!(alias = %alias, id = %handle.id(), "Disconnected");
        }
    }

    /// Removes an alias together with its live connection
    ///
    /// Does nothing if the alias is unknown.
    pub fn remove_connection(&self, alias: &str) {
        let Some(entry) = self.entries().remove(alias) else {
            return;
        };

        if let Some(handle) = entry.handle {
            handle.close();
        }
        tracing::debug!(alias = %alias, "Removed alias");
    }

    /// Closes every connection and restores the initial state, where only the
    /// default alias is configured
    pub fn reset(&self) {
        let mut entries = self.entries();
        for handle in entries.values_mut().filter_map(|entry| entry.handle.take()) {
            handle.close();
        }
        entries.clear();
        entries.insert(
            DEFAULT_ALIAS.to_string(),
            AliasEntry::new(self.default_config.clone()),
        );
        tracing::debug!("Registry reset");
    }

    // ========== Queries ==========

    /// Returns the live connection of an alias
    #[must_use]
    pub fn get_connection(&self, alias: &str) -> Option<ConnectionHandle> {
        self.entries()
            .get(alias)
            .and_then(|entry| entry.handle.clone())
    }

    /// Returns the stored configuration of an alias, or an empty
    /// configuration if the alias is unknown
    #[must_use]
    pub fn get_connection_addr(&self, alias: &str) -> ConnectionConfig {
        self.entries()
            .get(alias)
            .map(|entry| entry.config.clone())
            .unwrap_or_default()
    }

    /// Lists every configured alias with its live connection, ordered by alias
    #[must_use]
    pub fn list_connections(&self) -> Vec<(String, Option<ConnectionHandle>)> {
        self.entries()
            .iter()
            .map(|(alias, entry)| (alias.clone(), entry.handle.clone()))
            .collect()
    }

    /// Returns true if the alias has a stored configuration
    #[must_use]
    pub fn has_connection(&self, alias: &str) -> bool {
        self.entries().contains_key(alias)
    }

    /// Returns the configured aliases, ordered by alias
    #[must_use]
    pub fn aliases(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    /// Returns every alias with its stored configuration, ordered by alias
    #[must_use]
    pub fn configs(&self) -> Vec<(String, ConnectionConfig)> {
        self.entries()
            .iter()
            .map(|(alias, entry)| (alias.clone(), entry.config.clone()))
            .collect()
    }

    /// Returns the number of configured aliases
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.entries().len()
    }

    /// Returns the number of aliases with a live connection
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.entries()
            .values()
            .filter(|entry| entry.handle.is_some())
            .count()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("entries", &*self.entries())
            .field("default_config", &self.default_config)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}
