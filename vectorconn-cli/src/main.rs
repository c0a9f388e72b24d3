//! `vectorconn` CLI - Command-line interface for the connection alias registry
//!
//! Provides commands for listing, inspecting, adding and removing connection
//! aliases, and for testing a connection through an alias. Aliases are kept
//! in the configuration directory between invocations.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vectorconn_core::{
    ClientSettings, ConfigManager, ConnectionConfig, ConnectionError, ConnectionRegistry,
};

/// `vectorconn` command-line interface for managing connection aliases
#[derive(Parser)]
#[command(name = "vectorconn-cli")]
#[command(author, version, about = "vectorconn command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding config.toml and aliases.toml
    #[arg(short, long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List all aliases
    #[command(about = "List all configured connection aliases")]
    List {
        /// Output format for the alias list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Show the configuration of an alias
    #[command(about = "Show the stored configuration of an alias")]
    Addr {
        /// Alias name
        alias: String,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Add or replace an alias
    #[command(about = "Store the configuration of an alias")]
    Add {
        /// Alias name
        alias: String,

        /// Server host
        #[arg(short = 'H', long)]
        host: String,

        /// Server port
        #[arg(short, long)]
        port: String,

        /// Extra connection parameters
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Remove an alias
    #[command(about = "Remove an alias and its configuration")]
    Remove {
        /// Alias name
        alias: String,
    },

    /// Connect through an alias
    #[command(about = "Open a connection through an alias, then close it")]
    Connect {
        /// Alias name
        alias: String,

        /// Server host, overriding the stored one
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Server port, overriding the stored one
        #[arg(short, long)]
        port: Option<String>,

        /// Extra connection parameters
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Connection timeout in seconds
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
    },
}

/// Output format for listing commands
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    Table,
    /// Output as JSON
    Json,
}

/// Parse a key=value pair for connection parameters
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    let key = &s[..pos];
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{s}`"));
    }
    Ok((key.to_string(), s[pos + 1..].to_string()))
}

fn main() {
    let cli = Cli::parse();

    let config_manager = match cli.config_dir {
        Some(dir) => Ok(ConfigManager::with_config_dir(dir)),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    };
    let settings = config_manager.as_ref().map_or_else(
        |_| Ok(ClientSettings::default()),
        |manager| {
            manager
                .load_settings()
                .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
        },
    );

    let level = settings
        .as_ref()
        .map_or("info", |s| s.logging.level.as_str());
    init_logging(level);

    let result = config_manager.and_then(|manager| {
        let settings = settings?;
        run(cli.command, &manager, settings)
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Installs the stderr subscriber, preferring `RUST_LOG` over the configured level
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(
    command: Commands,
    config_manager: &ConfigManager,
    settings: ClientSettings,
) -> Result<(), CliError> {
    match command {
        Commands::List { format } => {
            let session = Session::open(config_manager, &settings)?;
            cmd_list(&session.registry, format)
        }
        Commands::Addr { alias, format } => {
            let session = Session::open(config_manager, &settings)?;
            cmd_addr(&session.registry, &alias, format)
        }
        Commands::Add {
            alias,
            host,
            port,
            params,
        } => {
            let session = Session::open(config_manager, &settings)?;
            cmd_add(&session.registry, &alias, build_config(Some(host), Some(port), params))?;
            session.save()
        }
        Commands::Remove { alias } => {
            let session = Session::open(config_manager, &settings)?;
            cmd_remove(&session.registry, &alias)?;
            session.save()
        }
        Commands::Connect {
            alias,
            host,
            port,
            params,
            timeout,
        } => {
            let mut settings = settings;
            if let Some(secs) = timeout {
                settings.connect.timeout_secs = secs;
            }
            let session = Session::open(config_manager, &settings)?;
            let result = cmd_connect(&session.registry, &alias, build_config(host, port, params));
            // A failed attempt still records the configuration it tried.
            session.save()?;
            result
        }
    }
}

/// Registry loaded from the configuration directory for one invocation
struct Session<'a> {
    config_manager: &'a ConfigManager,
    registry: ConnectionRegistry,
}

impl<'a> Session<'a> {
    /// Builds a registry from settings and replays the stored aliases into it
    fn open(config_manager: &'a ConfigManager, settings: &ClientSettings) -> Result<Self, CliError> {
        let registry = ConnectionRegistry::from_settings(settings);
        let aliases = config_manager
            .load_aliases()
            .map_err(|e| CliError::Config(format!("Failed to load aliases: {e}")))?;
        tracing::debug!(count = aliases.len(), "Loaded stored aliases");
        registry.add_connection(aliases)?;

        Ok(Self {
            config_manager,
            registry,
        })
    }

    /// Writes the registry's alias table back to disk
    fn save(&self) -> Result<(), CliError> {
        let configs = self.registry.configs();
        self.config_manager
            .save_aliases(configs.iter().map(|(alias, config)| (alias.as_str(), config)))
            .map_err(|e| CliError::Config(format!("Failed to save aliases: {e}")))
    }
}

/// Builds a configuration from optional host/port flags and extra parameters
fn build_config(
    host: Option<String>,
    port: Option<String>,
    params: Vec<(String, String)>,
) -> ConnectionConfig {
    let mut config: ConnectionConfig = params.into_iter().collect();
    if let Some(host) = host {
        config.insert("host", host);
    }
    if let Some(port) = port {
        config.insert("port", port);
    }
    config
}

/// List aliases command handler
fn cmd_list(registry: &ConnectionRegistry, format: OutputFormat) -> Result<(), CliError> {
    let rows: Vec<AliasOutput> = registry
        .list_connections()
        .into_iter()
        .map(|(alias, handle)| AliasOutput {
            config: registry.get_connection_addr(&alias),
            connected: handle.is_some(),
            alias,
        })
        .collect();

    match format {
        OutputFormat::Table => println!("{}", format_table(&rows)),
        OutputFormat::Json => println!("{}", format_json(&rows)?),
    }

    Ok(())
}

/// Show alias configuration command handler
fn cmd_addr(registry: &ConnectionRegistry, alias: &str, format: OutputFormat) -> Result<(), CliError> {
    let config = registry.get_connection_addr(alias);

    match format {
        OutputFormat::Table => println!("{}", format_config(alias, &config)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&config)
                .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))?
        ),
    }

    Ok(())
}

/// Add alias command handler
fn cmd_add(registry: &ConnectionRegistry, alias: &str, config: ConnectionConfig) -> Result<(), CliError> {
    let shown = config.to_string();
    registry.add_connection([(alias, config)])?;
    println!("Stored alias '{alias}' with {shown}");
    Ok(())
}

/// Remove alias command handler
fn cmd_remove(registry: &ConnectionRegistry, alias: &str) -> Result<(), CliError> {
    if !registry.has_connection(alias) {
        println!("Alias '{alias}' is not configured");
        return Ok(());
    }

    registry.remove_connection(alias);
    println!("Removed alias '{alias}'");
    Ok(())
}

/// Connect command handler
fn cmd_connect(
    registry: &ConnectionRegistry,
    alias: &str,
    overrides: ConnectionConfig,
) -> Result<(), CliError> {
    println!("Connecting '{alias}'...");
    let handle = registry.connect(alias, overrides)?;

    println!(
        "Connected '{}' to {} (id {}, at {})",
        handle.alias(),
        handle.peer(),
        handle.id(),
        handle.connected_at().format("%Y-%m-%d %H:%M:%S UTC")
    );

    registry.disconnect(alias);
    Ok(())
}

/// Alias summary for CLI output
#[derive(Debug, Clone, serde::Serialize)]
pub struct AliasOutput {
    pub alias: String,
    pub connected: bool,
    pub config: ConnectionConfig,
}

/// Format aliases as a table string
#[must_use]
pub fn format_table(rows: &[AliasOutput]) -> String {
    if rows.is_empty() {
        return "No aliases configured.".to_string();
    }

    let mut output = String::new();

    let alias_width = rows
        .iter()
        .map(|r| r.alias.len())
        .max()
        .unwrap_or(5)
        .max(5);
    let status_width = 9; // "CONNECTED"

    let _ = writeln!(
        output,
        "{:<alias_width$}  {:<status_width$}  CONFIG",
        "ALIAS", "STATUS"
    );
    let _ = writeln!(
        output,
        "{:-<alias_width$}  {:-<status_width$}  {:-<6}",
        "", "", ""
    );

    for row in rows {
        let status = if row.connected { "connected" } else { "-" };
        let _ = writeln!(
            output,
            "{:<alias_width$}  {:<status_width$}  {}",
            row.alias, status, row.config
        );
    }

    output.trim_end().to_string()
}

/// Format aliases as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(rows: &[AliasOutput]) -> Result<String, CliError> {
    serde_json::to_string_pretty(rows)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format the configuration of one alias as `KEY  VALUE` lines
#[must_use]
pub fn format_config(alias: &str, config: &ConnectionConfig) -> String {
    if config.is_empty() {
        return format!("No configuration for alias '{alias}'.");
    }

    let key_width = config.iter().map(|(k, _)| k.len()).max().unwrap_or(3).max(3);
    let mut output = String::new();
    let _ = writeln!(output, "{:<key_width$}  VALUE", "KEY");
    for (key, value) in config.iter() {
        let _ = writeln!(output, "{key:<key_width$}  {value}");
    }

    output.trim_end().to_string()
}

/// Exit codes for CLI operations
pub mod exit_codes {
    /// Success - operation completed successfully
    pub const SUCCESS: i32 = 0;
    /// General error - configuration, conflicting or missing alias parameters
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the server could not be reached
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Registry rejected the request or the connection failed
    #[error("{0}")]
    Registry(#[from] ConnectionError),

}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, conflicts, missing parameters)
    /// - 2: Connection failure
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Registry(ConnectionError::ConnectionFailed { .. }) => {
                exit_codes::CONNECTION_FAILURE
            }
            Self::Config(_) | Self::Registry(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
