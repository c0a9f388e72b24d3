//! Transport seam between the registry and the remote service
//!
//! The registry never speaks the wire protocol itself. It asks a [`Connector`]
//! to establish a [`Transport`] to an [`Endpoint`] and keeps the result inside a
//! `ConnectionHandle`. [`TcpConnector`] is the default implementation; tests
//! and embedders can supply their own.

mod tcp;

pub use tcp::{TcpConnector, TcpTransport};

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::models::{ConnectionConfig, HOST_KEY, PORT_KEY};

/// Errors reported by a [`Connector`]
///
/// The `Display` text is used verbatim as the failure reason of
/// `ConnectionError::ConnectionFailed`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A required key was absent from the configuration
    #[error("missing '{0}'")]
    MissingKey(&'static str),

    /// The port is not a valid TCP port number
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    /// The host name did not resolve to any address
    #[error("unable to resolve '{host}': {reason}")]
    Resolve {
        /// Host that failed to resolve
        host: String,
        /// Resolver error
        reason: String,
    },

    /// No resolved address answered within the timeout
    #[error("Timeout")]
    Timeout,

    /// The server refused or dropped the connection
    #[error("{0}")]
    Unreachable(String),
}

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Host and numeric port of a server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolves the endpoint described by a connection configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `host` or `port` is missing or the port does not
    /// parse as a `u16`.
    pub fn from_config(config: &ConnectionConfig) -> TransportResult<Self> {
        let host = config
            .host()
            .ok_or(TransportError::MissingKey(HOST_KEY))?;
        let raw_port = config
            .port()
            .ok_or(TransportError::MissingKey(PORT_KEY))?;
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| TransportError::InvalidPort(raw_port.to_string()))?;
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A live connection to the remote service
pub trait Transport: Send + Sync + fmt::Debug {
    /// Address of the remote peer
    fn peer(&self) -> String;

    /// Returns true until [`close`](Self::close) has been called
    fn is_open(&self) -> bool;

    /// Closes the connection. Calling it more than once is a no-op.
    fn close(&self);
}

/// Factory for [`Transport`]s
pub trait Connector: Send + Sync {
    /// Establishes a connection to `endpoint`, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached in time.
    fn establish(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> TransportResult<Box<dyn Transport>>;
}
