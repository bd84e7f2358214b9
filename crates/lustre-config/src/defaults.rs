use crate::logging::LogFormat;

/// Default log filter expression applied when nothing overrides it.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable naming the configuration file.
pub const ENV_CONFIG_PATH: &str = "LUSTRE_CONFIG_PATH";

/// Environment variable overriding the log filter.
pub const ENV_LOG_FILTER: &str = "LUSTRE_LOG_FILTER";

/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "LUSTRE_LOG_FORMAT";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
