//! Configuration file resolution and loading
//!
//! Config file location is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PTAX_CONFIG`)
//! 3. Per-user config file (`~/.config/ptax/config.toml` or platform equivalent)
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly (1 or 2) must exist. The per-user file is optional:
//! when it is missing the service starts on compiled defaults with a warning.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PTAX_CONFIG";

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config <path>`
    CommandLine(PathBuf),
    /// `PTAX_CONFIG=<path>`
    Environment(PathBuf),
    /// Per-user config file that exists on disk
    UserFile(PathBuf),
    /// No file; built-in defaults only
    CompiledDefaults,
}

impl ConfigSource {
    /// Path of the config file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p) | ConfigSource::Environment(p) | ConfigSource::UserFile(p) => {
                Some(p.as_path())
            }
            ConfigSource::CompiledDefaults => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ConfigSource::CommandLine(_) => "command line",
            ConfigSource::Environment(_) => "environment",
            ConfigSource::UserFile(_) => "user config file",
            ConfigSource::CompiledDefaults => "compiled defaults",
        }
    }
}

/// Logging configuration (`[logging]` table)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
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

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve which config file to use
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Some(path) = env_value(CONFIG_ENV_VAR) {
        return ConfigSource::Environment(PathBuf::from(path));
    }

    // Priority 3: Per-user config file
    if let Some(path) = user_config_path() {
        if path.exists() {
            return ConfigSource::UserFile(path);
        }
    }

    // Priority 4: Compiled defaults
    ConfigSource::CompiledDefaults
}

/// Platform config path: `<config_dir>/ptax/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ptax").join("config.toml"))
}

/// Load and parse the resolved config file into `T`
///
/// Returns `T::default()` for [`ConfigSource::CompiledDefaults`].
pub fn load_toml<T>(source: &ConfigSource) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = source.path() else {
        warn!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file from {} not found: {}",
            source.describe(),
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let config = parse_toml(&content)?;
    info!("Loaded config from {} ({})", path.display(), source.describe());
    Ok(config)
}

/// Parse TOML text into `T`
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(toml::from_str(content)?)
}

/// Read an environment variable, treating empty/whitespace values as unset
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

/// Validate a key or setting value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
