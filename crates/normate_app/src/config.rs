//! `normate.ron` configuration.
//!
//! Every field is optional in the file; anything missing falls back to the
//! built-in defaults, and command-line flags override both.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use normate_core::{Perspective, PollPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use normate_engine::{ApiSettings, ExportSettings};
use normate_logging::{normate_debug, LogDestination};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "normate.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
    pub output_dir: PathBuf,
    pub default_perspective: Perspective,
    pub log_destination: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            base_url: api.base_url,
            connect_timeout_ms: api.connect_timeout.as_millis() as u64,
            request_timeout_ms: api.request_timeout.as_millis() as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            poll_max_attempts: DEFAULT_MAX_ATTEMPTS,
            output_dir: PathBuf::from("output"),
            default_perspective: Perspective::default(),
            log_destination: "terminal".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `explicit`, or from `./normate.ron` when no path was given.
    ///
    /// The default file may be absent; an explicitly named one may not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::Missing(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        normate_debug!("Loaded configuration from {:?}", path);
        config.validate()?;
        Ok(config)
    }

    fn from_ron(text: &str) -> Result<Self, String> {
        ron::from_str(text).map_err(|err| err.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.poll_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "poll_max_attempts must be at least 1".into(),
            ));
        }
        if LogDestination::parse(&self.log_destination).is_none() {
            return Err(ConfigError::Invalid(format!(
                "log_destination '{}' is not one of terminal, file, both, off",
                self.log_destination
            )));
        }
        Ok(())
    }

    pub fn log_destination(&self) -> LogDestination {
        LogDestination::parse(&self.log_destination).unwrap_or_default()
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..ApiSettings::default()
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.poll_max_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            output_dir: self.output_dir.clone(),
            ..ExportSettings::default()
        }
    }
}
