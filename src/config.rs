use crate::core::{DbError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub connection: Option<ConnectionConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration.
#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    /// Connection string used when none is given on the command line
    pub string: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Maximum tracing level: trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,
    /// Print every statement before it runs
    #[serde(default)]
    pub log_statements: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            log_statements: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Connection string from the `[connection]` section, if set and non-blank
    pub fn connection_string(&self) -> Option<&str> {
        self.connection
            .as_ref()?
            .string
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Parses the configured level into a tracing level.
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse::<tracing::Level>()
            .map_err(|_| DbError::Config(format!("unknown log level `{}`", self.logging.level)))
    }
}

/// Default configuration file location: `<config dir>/sqlbind/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlbind").join("config.toml"))
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Example
///
/// ```no_run
/// let config = sqlbind::config::load_config("sqlbind.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| DbError::Config(e.to_string()))
}

/// Loads the default configuration file, falling back to defaults when it does not exist.
pub fn load_default_config() -> Result<Config> {
    match default_config_path() {
        Some(path) if path.exists() => load_config(path),
        _ => Ok(Config::default()),
    }
}
