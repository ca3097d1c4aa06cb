//! Core configuration, loaded from TOML.
//!
//! ```toml
//! [admission.general]
//! limit = 100
//! window_secs = 60
//!
//! [admission.auth]
//! limit = 5
//!
//! [scoring]
//! horizon_hours = 336
//! timeout_ms = 250
//! ```
//!
//! Every key is optional; missing keys take the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::admission::AdmissionConfig;
use crate::scoring::ScoreConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub admission: AdmissionConfig,
    pub scoring: ScoreConfig,
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admission.general.validate("admission.general")?;
        self.admission.auth.validate("admission.auth")?;
        self.scoring.validate()?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Parse a config file without semantic checks. See [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: CoreConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Parse a config file and reject out-of-range values.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let config = load_from_path(path)?;
    config.validate()?;
    Ok(config)
}

/// `plait.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("plait.toml")
}
