//! Configuration manager for TOML file operations
//!
//! This module provides the `ConfigManager` which handles loading and saving
//! the client settings and the alias table kept between CLI invocations.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::models::ConnectionConfig;

use super::settings::ClientSettings;

/// File names for configuration files
const CONFIG_FILE: &str = "config.toml";
const ALIASES_FILE: &str = "aliases.toml";

/// Wrapper for serializing the alias table
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct AliasesFile {
    #[serde(default)]
    aliases: BTreeMap<String, ConnectionConfig>,
}

/// Configuration manager for `vectorconn`
///
/// Handles loading and saving configuration files in TOML format.
/// Configuration is stored in `~/.config/vectorconn/` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Base directory for configuration files
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new `ConfigManager` with the default configuration directory
    ///
    /// # Errors
    ///
    /// Returns an error if the user configuration directory cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound(PathBuf::from("~/.config")))?
            .join("vectorconn");
        Ok(Self { config_dir })
    }

    /// Creates a new `ConfigManager` with a custom configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensures the configuration directory exists
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ConfigError::Write(format!(
                    "Failed to create config directory {}: {}",
                    self.config_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    // ========== Settings ==========

    /// Loads client settings, falling back to defaults if the file is absent
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_settings(&self) -> ConfigResult<ClientSettings> {
        Self::load_toml_file(&self.config_dir.join(CONFIG_FILE))
    }

    /// Saves client settings
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_settings(&self, settings: &ClientSettings) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        Self::save_toml_file(&self.config_dir.join(CONFIG_FILE), settings)
    }

    // ========== Aliases ==========

    /// Loads the stored alias configurations
    ///
    /// Returns an empty table if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_aliases(&self) -> ConfigResult<BTreeMap<String, ConnectionConfig>> {
        let path = self.config_dir.join(ALIASES_FILE);
        Self::load_toml_file::<AliasesFile>(&path).map(|f| f.aliases)
    }

    /// Saves alias configurations, replacing the previous table
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_aliases<'a, I>(&self, aliases: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a ConnectionConfig)>,
    {
        self.ensure_config_dir()?;
        let file = AliasesFile {
            aliases: aliases
                .into_iter()
                .map(|(alias, config)| (alias.to_string(), config.clone()))
                .collect(),
        };
        Self::save_toml_file(&self.config_dir.join(ALIASES_FILE), &file)
    }

    // ========== Helpers ==========

    /// Reads a TOML table, treating a missing file as an empty one
    fn load_toml_file<T>(path: &Path) -> ConfigResult<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::Parse(format!("{}: {}", path.display(), e.message()))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(ConfigError::Parse(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Writes a TOML table, replacing the previous file
    fn save_toml_file<T>(path: &Path, data: &T) -> ConfigResult<()>
    where
        T: serde::Serialize,
    {
        let rendered =
            toml::to_string_pretty(data).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, rendered)
            .map_err(|e| ConfigError::Write(format!("cannot write {}: {e}", path.display())))
    }
}
