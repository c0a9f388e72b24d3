//! Connection registry module
//!
//! This module provides the `ConnectionRegistry`, which owns the alias table
//! and the live connections created from it.

mod manager;

pub use manager::ConnectionRegistry;
