//! Client settings model
//!
//! This module defines the client-wide settings stored in config.toml.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::ConnectionConfig;

/// Name of the distinguished default alias
pub const DEFAULT_ALIAS: &str = "default";

/// Client-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Bootstrap configuration of the default alias
    #[serde(default)]
    pub default_connection: DefaultConnectionSettings,
    /// Connection establishment settings
    #[serde(default)]
    pub connect: ConnectSettings,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Host and port the default alias is created with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultConnectionSettings {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> String {
    "19530".to_string()
}

impl Default for DefaultConnectionSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DefaultConnectionSettings {
    /// Returns the configuration the default alias starts with
    #[must_use]
    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.host.clone(), self.port.clone())
    }
}

/// Connection establishment settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectSettings {
    /// Seconds to wait for the server before failing a connect; 0 leaves
    /// the limit to the operating system
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ConnectSettings {
    /// Connect timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}
