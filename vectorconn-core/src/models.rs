//! Core data models for `vectorconn`
//!
//! This module defines the connection configuration and the live connection
//! handle stored by the registry.

mod config;
mod handle;

pub use config::{ConnectionConfig, HOST_KEY, PORT_KEY, REQUIRED_KEYS};
pub use handle::ConnectionHandle;
