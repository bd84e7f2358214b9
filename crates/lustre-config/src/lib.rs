//! Shared configuration for hosts that run Lustre formatter steps.
//!
//! [`Config`] is resolved by `ortho_config`. Each layer overrides the one
//! before it:
//!
//! 1. built-in defaults ([`DEFAULT_LOG_FILTER`], [`LogFormat::Json`]);
//! 2. a TOML file named by `--config-path` or `LUSTRE_CONFIG_PATH`;
//! 3. the `LUSTRE_LOG_FILTER` and `LUSTRE_LOG_FORMAT` environment variables;
//! 4. the `--log-filter` and `--log-format` flags.
//!
//! The steps themselves carry their configuration as serialisable state, so
//! this crate only covers what a host sets up once per process.

mod defaults;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, ENV_CONFIG_PATH, ENV_LOG_FILTER, ENV_LOG_FORMAT, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::LogFormat;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or merged. `ortho_config` aggregates
    /// failures from several layers into one [`OrthoError`].
    #[error("failed to load configuration: {source}")]
    Load {
        /// Loader error.
        #[source]
        source: Arc<OrthoError>,
    },
}

impl From<Arc<OrthoError>> for ConfigError {
    fn from(source: Arc<OrthoError>) -> Self {
        Self::Load { source }
    }
}

/// Resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LUSTRE")]
pub struct Config {
    /// `tracing` filter expression applied to step events.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    log_filter: String,
    /// Rendering used for step events.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Creates a configuration with explicit values, bypassing every layer.
    #[must_use]
    pub fn new(log_filter: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            log_filter: log_filter.into(),
            log_format,
        }
    }

    /// Returns the `tracing` filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Resolves every layer using the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if a layer is unreadable or carries a
    /// value of the wrong shape.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::load().map_err(ConfigError::from)
    }

    /// Resolves every layer, taking command-line flags from `args`. The first
    /// item is the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] for an unknown flag, an unreadable or
    /// malformed file, or a value of the wrong shape in any layer.
    pub fn resolve_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::load_from_iter(args).map_err(ConfigError::from)
    }
}
