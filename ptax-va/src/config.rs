//! Service configuration for ptax-va
//!
//! One TOML document with `[server]`, `[logging]`, `[provider]` and
//! `[valuation]` tables, located via [`ptax_common::config`]. After loading:
//! - `PTAX_PROVIDER_API_KEY` replaces `provider.api_key` (env wins over TOML)
//! - command-line flags replace `server.host`, `server.port` and switch the
//!   provider to fixture mode
//! - the result is validated before the server starts

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use ptax_common::config::{env_value, is_valid_key, load_toml, resolve_config_source, LoggingConfig};
use ptax_common::{Error, Result};

use crate::valuation::ValuationConfig;

/// Environment variable carrying the upstream API key
pub const API_KEY_ENV_VAR: &str = "PTAX_PROVIDER_API_KEY";

/// Default listen port
pub const DEFAULT_PORT: u16 = 5730;

/// Longest comparable-sale look-back accepted from config
pub const MAX_MONTHS_BACK: u32 = 120;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub provider: ProviderConfig,
    pub valuation: ValuationConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which property data backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Http,
    Fixture,
}

/// `[provider]` table: upstream access and comparable search window
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub fixture_path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub requests_per_second: u32,
    /// Search radius passed to the comparable-sales query
    pub search_radius_miles: f64,
    /// Sale-date window passed to the comparable-sales query
    pub months_back: u32,
    /// Upper bound on records requested per comparable search
    pub comparable_limit: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Http,
            base_url: "https://api.rentcast.io/v1".to_string(),
            api_key: None,
            fixture_path: None,
            timeout_secs: 10,
            requests_per_second: 5,
            search_radius_miles: 1.0,
            months_back: 6,
            comparable_limit: 25,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub fixture: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve, load, override and validate
    pub fn load(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self> {
        let source = resolve_config_source(config_path);
        let mut config: ServiceConfig = load_toml(&source)?;

        config.provider.api_key = resolve_api_key(config.provider.api_key.as_deref());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(host) = &overrides.host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = &overrides.fixture {
            self.provider.kind = ProviderKind::Fixture;
            self.provider.fixture_path = Some(path.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.valuation.validate()?;

        let p = &self.provider;
        match p.kind {
            ProviderKind::Fixture if p.fixture_path.is_none() => {
                return Err(Error::Config(
                    "provider.kind = \"fixture\" requires provider.fixture_path (or --fixture)".to_string(),
                ));
            }
            ProviderKind::Http if p.api_key.is_none() => {
                return Err(Error::Config(format!(
                    "Property data API key not configured. Please configure using one of:\n\
                     1. Environment: {}=your-key-here\n\
                     2. TOML config: [provider] api_key = \"your-key\"\n\
                     Or run offline with --fixture <file>",
                    API_KEY_ENV_VAR
                )));
            }
            _ => {}
        }

        if p.timeout_secs == 0 {
            return Err(Error::Config("provider.timeout_secs must be > 0".to_string()));
        }
        if p.requests_per_second == 0 {
            return Err(Error::Config("provider.requests_per_second must be > 0".to_string()));
        }
        if !p.search_radius_miles.is_finite() || p.search_radius_miles <= 0.0 {
            return Err(Error::Config("provider.search_radius_miles must be > 0".to_string()));
        }
        if p.months_back > MAX_MONTHS_BACK {
            return Err(Error::Config(format!(
                "provider.months_back must be at most {}",
                MAX_MONTHS_BACK
            )));
        }
        if p.comparable_limit == 0 {
            return Err(Error::Config("provider.comparable_limit must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Pick the upstream API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(toml_key: Option<&str>) -> Option<String> {
    let env_key = env_value(API_KEY_ENV_VAR);
    let toml_key = toml_key.filter(|k| is_valid_key(k));

    match (env_key, toml_key) {
        (Some(env), Some(_)) => {
            warn!(
                "Provider API key found in both {} and TOML config. Using environment variable.",
                API_KEY_ENV_VAR
            );
            Some(env)
        }
        (Some(env), None) => {
            info!("Provider API key loaded from environment variable");
            Some(env)
        }
        (None, Some(key)) => {
            info!("Provider API key loaded from TOML config");
            Some(key.to_string())
        }
        (None, None) => None,
    }
}
