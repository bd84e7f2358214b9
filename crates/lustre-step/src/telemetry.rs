//! Renders step lifecycle events through `tracing`.
//!
//! Steps emit `debug` events when they compute state, build a formatter and
//! release one, each carrying a `step` field with the step name. A host calls
//! [`initialise`] once per process to send them to stderr. [`subscriber`]
//! builds the same pipeline over any writer, for scoped use with
//! [`tracing::subscriber::with_default`].
//!
//! Only compiled with the `telemetry` feature.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};

use lustre_config::Config;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// A boxed subscriber rendering step events.
pub type StepSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that the process-wide subscriber is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while setting up step telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression did not parse.
    #[error("invalid log filter '{filter}': {reason}")]
    Filter {
        /// Expression taken from the configuration.
        filter: String,
        /// Parser message.
        reason: String,
    },
    /// Another subscriber was already installed globally.
    #[error("failed to install step telemetry: {0}")]
    Subscriber(#[source] SetGlobalDefaultError),
}

/// Builds a subscriber that writes step events to `writer` without colour.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] if the configured filter is malformed.
pub fn subscriber<W>(config: &Config, writer: W) -> Result<StepSubscriber, TelemetryError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    build(config, writer, false)
}

/// Installs the stderr subscriber on the first call.
///
/// Later calls return a handle without touching global state. A failed first
/// call is not remembered, so the host may retry with a corrected
/// configuration.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for a malformed filter and
/// [`TelemetryError::Subscriber`] if some other subscriber is already set.
///
/// # Example
///
/// ```
/// use lustre_config::Config;
/// use lustre_step::telemetry;
///
/// let config = Config::default();
/// telemetry::initialise(&config)?;
/// telemetry::initialise(&config)?;
/// # Ok::<(), lustre_step::telemetry::TelemetryError>(())
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| {
            let ansi = !config.log_format().is_structured() && io::stderr().is_terminal();
            let installed = build(config, io::stderr, ansi)?;
            tracing::subscriber::set_global_default(installed).map_err(TelemetryError::Subscriber)
        })
        .map(|()| TelemetryHandle)
}

fn parse_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        filter: config.log_filter().to_owned(),
        reason: error.to_string(),
    })
}

fn build<W>(config: &Config, writer: W, ansi: bool) -> Result<StepSubscriber, TelemetryError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = fmt::Subscriber::builder()
        .with_env_filter(parse_filter(config)?)
        .with_target(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(if config.log_format().is_structured() {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.compact().finish())
    })
}
