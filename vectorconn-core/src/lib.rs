//! `vectorconn` Core Library
//!
//! This crate provides the connection alias registry of a vector-database
//! client: the table mapping aliases to connection configurations and live
//! connection handles, together with the transport seam used to open those
//! connections and the settings that bootstrap the registry.

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod transport;

pub use config::{ClientSettings, ConfigManager, DEFAULT_ALIAS};
pub use error::{
    ConfigError, ConfigResult, ConflictOrigin, ConnectionError, ConnectionResult, VectorConnError,
};
pub use models::{ConnectionConfig, ConnectionHandle};
pub use registry::ConnectionRegistry;
pub use transport::{
    Connector, Endpoint, TcpConnector, Transport, TransportError, TransportResult,
};
