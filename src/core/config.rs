//! Configuration types and management for pyshape-rs.
//!
//! The configuration only affects how a request is answered: default mode,
//! output formatting and input limits. The classification tables are fixed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{PyshapeError, Result};
use crate::traversal::Mode;

/// Main configuration for the pyshape engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyshapeConfig {
    /// Mode used when a request does not name one
    pub default_mode: Mode,

    /// Pretty-print the JSON response
    pub pretty: bool,

    /// Reject sources larger than this many bytes (unlimited when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_source_bytes: Option<usize>,
}

impl Default for PyshapeConfig {
    fn default() -> Self {
        Self {
            default_mode: Mode::Simple,
            pretty: false,
            max_source_bytes: None,
        }
    }
}

impl PyshapeConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            PyshapeError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.max_source_bytes == Some(0) {
            return Err(PyshapeError::config_field(
                "max_source_bytes must be greater than 0",
                "max_source_bytes",
            ));
        }
        Ok(())
    }

    /// Check a source against the configured size limit.
    pub fn check_source(&self, code: &str) -> Result<()> {
        match self.max_source_bytes {
            Some(limit) if code.len() > limit => Err(PyshapeError::validation_field(
                format!(
                    "source is {} bytes, larger than the configured limit of {limit}",
                    code.len()
                ),
                "code",
            )),
            _ => Ok(()),
        }
    }
}
