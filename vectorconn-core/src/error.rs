//! Error types for `vectorconn`
//!
//! This module defines the error types used by the connection registry and
//! the settings layer. Registry reads (`get_connection`, `get_connection_addr`,
//! `list_connections`) and the removal operations never fail, so only
//! `add_connection` and `connect` surface a [`ConnectionError`].

use std::path::PathBuf;
use thiserror::Error;

use crate::models::ConnectionConfig;

/// Top-level error type for `vectorconn` operations
#[derive(Debug, Error)]
pub enum VectorConnError {
    /// Connection registry errors
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Settings and alias file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operation that detected a configuration conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictOrigin {
    /// `add_connection` on an alias that is already connected
    AddConnection,
    /// `connect` with parameters that differ from the live connection
    Connect,
}

/// Errors raised by the connection registry
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// `connect` was called for an alias with no stored configuration
    /// and no inline parameters
    #[error("You need to pass in the configuration of the connection named '{alias}'")]
    MissingConfig {
        /// The alias that has no configuration
        alias: String,
    },

    /// The effective configuration lacks a key required to open a connection
    #[error(
        "Param is not complete. Please invoke as follow: \
         connect(alias='{}', host='<host>', port='<port>'); missing: {}",
        .alias,
        .missing.join(", ")
    )]
    IncompleteConfig {
        /// The alias being connected
        alias: String,
        /// Required keys that were absent
        missing: Vec<&'static str>,
    },

    /// The requested configuration differs from the one of a live connection
    #[error(
        "{} (existing: {}, requested: {})",
        conflict_message(.alias, .origin),
        .existing,
        .requested
    )]
    ConfigConflict {
        /// The alias that is already connected
        alias: String,
        /// Which operation detected the conflict
        origin: ConflictOrigin,
        /// Configuration of the live connection
        existing: ConnectionConfig,
        /// Configuration that was passed in
        requested: ConnectionConfig,
    },

    /// The transport could not reach the server
    #[error("Fail connecting to server on {host}:{port}. {reason}")]
    ConnectionFailed {
        /// The alias being connected
        alias: String,
        /// Target host
        host: String,
        /// Target port, as configured
        port: String,
        /// Underlying reason reported by the transport
        reason: String,
    },
}

impl ConnectionError {
    /// Returns the alias the error refers to
    #[must_use]
    pub fn alias(&self) -> &str {
        match self {
            Self::MissingConfig { alias }
            | Self::IncompleteConfig { alias, .. }
            | Self::ConfigConflict { alias, .. }
            | Self::ConnectionFailed { alias, .. } => alias,
        }
    }

    /// Returns true if the caller must supply configuration and retry
    #[must_use]
    pub const fn is_missing_config(&self) -> bool {
        matches!(
            self,
            Self::MissingConfig { .. } | Self::IncompleteConfig { .. }
        )
    }

    /// Returns true if the error is a configuration conflict
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::ConfigConflict { .. })
    }

    /// Returns true if the transport failed to establish the connection
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }
}

fn conflict_message(alias: &str, origin: &ConflictOrigin) -> String {
    match origin {
        ConflictOrigin::AddConnection => format!(
            "alias of '{alias}' already creating connections, \
             but the configure is not the same as passed in."
        ),
        ConflictOrigin::Connect => format!(
            "The connection named {alias} already creating, \
             but passed parameters don't match the configured parameters, \
             please remove the connection first"
        ),
    }
}

/// Errors related to settings and alias files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Configuration directory could not be determined
    #[error("Configuration directory not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write a configuration file
    #[error("Failed to write configuration: {0}")]
    Write(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Result type alias for `vectorconn` operations
pub type Result<T> = std::result::Result<T, VectorConnError>;

/// Result type alias for registry operations
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
