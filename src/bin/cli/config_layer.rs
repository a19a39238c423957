//! Configuration layer management.
//!
//! Built-in defaults, then the configuration file, then CLI flags.

use tracing::debug;

use crate::cli::args::Cli;
use pyshape_rs::PyshapeConfig;

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another layer into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

/// Overrides taken from command-line flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides {
    pub pretty: bool,
    pub default_mode: Option<pyshape_rs::Mode>,
}

impl CliOverrides {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            pretty: cli.pretty,
            default_mode: cli.default_mode,
        }
    }
}

impl ConfigMerge<CliOverrides> for PyshapeConfig {
    fn merge_with(&mut self, other: CliOverrides) {
        // --pretty can only switch pretty printing on
        self.pretty |= other.pretty;
        if let Some(mode) = other.default_mode {
            self.default_mode = mode;
        }
    }
}

/// Resolve the effective configuration for this invocation.
pub fn build_config(cli: &Cli) -> anyhow::Result<PyshapeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration file");
            PyshapeConfig::from_yaml_file(path)?
        }
        None => PyshapeConfig::default(),
    };

    config.merge_with(CliOverrides::from_cli(cli));
    config.validate()?;
    Ok(config)
}
