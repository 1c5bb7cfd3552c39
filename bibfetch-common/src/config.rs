//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a single TOML file, located by priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. OS-dependent default location (`<config_dir>/bibfetch/config.toml`)
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BIBFETCH_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Sources to query when none are given on the command line
    #[serde(default)]
    pub sources: Option<Vec<String>>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-call fetch options handed to every source
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Per-field source priority overrides (field name → source names)
    #[serde(default)]
    pub priority: BTreeMap<String, Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Fetch configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent to every source
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where a configuration file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Given explicitly (command line or environment); must exist
    Explicit(PathBuf),
    /// OS default location; optional
    Default(PathBuf),
    /// No location could be determined
    None,
}

/// Resolve the configuration file location
///
/// An explicit path (CLI or environment) is returned even if the file does
/// not exist, so that loading reports the mistake instead of silently
/// falling back to defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> ConfigLocation {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigLocation::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return ConfigLocation::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: OS-dependent default
    match default_config_path() {
        Some(path) => ConfigLocation::Default(path),
        None => ConfigLocation::None,
    }
}

/// Get default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bibfetch").join("config.toml"))
}

/// Parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Read config {} failed: {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config {} failed: {}", path.display(), e)))
}

/// Load the bootstrap configuration following the resolution priority
///
/// A missing file at the default location yields built-in defaults; a
/// missing explicit file is an error.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    load_config_with_location(cli_arg).map(|(config, _)| config)
}

/// Same as [`load_config`], also returning the file that was read
///
/// The path is `None` when built-in defaults were used. Callers that load
/// configuration before installing a log subscriber report it afterwards.
pub fn load_config_with_location(cli_arg: Option<&Path>) -> Result<(TomlConfig, Option<PathBuf>)> {
    match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
        ConfigLocation::Explicit(path) => {
            info!("Loading config from {}", path.display());
            let config = load_toml_config(&path)?;
            Ok((config, Some(path)))
        }
        ConfigLocation::Default(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            let config = load_toml_config(&path)?;
            Ok((config, Some(path)))
        }
        ConfigLocation::Default(path) => {
            debug!(path = %path.display(), "No config file, using built-in defaults");
            Ok((TomlConfig::default(), None))
        }
        ConfigLocation::None => {
            debug!("Config directory unknown, using built-in defaults");
            Ok((TomlConfig::default(), None))
        }
    }
}
