/// Service configuration loader - parses climate_api.toml
///
/// Keeps listener and validation settings out of the code so they can be
/// changed without recompiling. Every field has a default, so a missing
/// file yields the stock configuration. The database location is not part
/// of this file; it comes from `DATABASE_URL` (see `db`).

use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "climate_api.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings loaded from climate_api.toml.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interface the HTTP listener binds to.
    pub bind_address: String,
    pub port: u16,
    /// Size of the request worker pool.
    pub worker_threads: usize,
    /// Reject `start`/`end` segments that are not `YYYY-MM-DD` with a 400
    /// instead of letting them fall through to a lexical comparison.
    pub strict_date_validation: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            worker_threads: 4,
            strict_date_validation: false,
        }
    }
}

impl ServiceConfig {
    /// `host:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::Invalid("worker_threads must be at least 1".into()));
        }
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address must not be empty".into()));
        }
        Ok(self)
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str, path: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    config.validate()
}

/// Loads configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let display = path.display().to_string();

    match fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, &display),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("{} not found, using default configuration", display);
            Ok(ServiceConfig::default())
        }
        Err(source) => Err(ConfigError::Read { path: display, source }),
    }
}
