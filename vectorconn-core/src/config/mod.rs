//! Configuration management for `vectorconn`
//!
//! This module provides the `ConfigManager` for loading and saving
//! configuration files in TOML format.

mod manager;
pub mod settings;

pub use manager::ConfigManager;
pub use settings::{
    ClientSettings, ConnectSettings, DefaultConnectionSettings, LoggingSettings, DEFAULT_ALIAS,
};
