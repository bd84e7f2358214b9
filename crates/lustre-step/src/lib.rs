//! Lazily evaluated, state-compared formatter steps.
//!
//! A formatter step is one named transformation in a code-formatting
//! pipeline. Each step captures the configuration that determines its output
//! as a serialisable *state*, and derives an executable [`Formatter`] from
//! that state. Both are computed on demand and memoised:
//!
//! - constructing a step does no work;
//! - the first [`format`](FormatterStep::format),
//!   [`lint`](FormatterStep::lint), equality check or
//!   [`fingerprint`](FormatterStep::fingerprint) computes the state once;
//! - the formatter is built once from the cached state and reused until
//!   [`dispose_function`](FormatterStep::dispose_function) releases it.
//!
//! Steps compare, hash and serialise by state alone. Renaming a step or
//! swapping its builder for an equivalent one therefore keeps cached results
//! valid, while [`VolatileStep`] opts out of caching entirely.
//!
//! Steps are `Send` but not `Sync`: a step is owned by one worker at a time.
//!
//! # Features
//!
//! - `telemetry` (default): the `telemetry` module, which renders step
//!   lifecycle events with `tracing-subscriber`.
//! - `test-support`: the `harness` module.
//!
//! # Example
//!
//! ```
//! use lustre_step::{FileContext, Formatter, FormatterStep, StandardStep};
//!
//! let indent = StandardStep::new(
//!     "indent",
//!     || Ok(4_usize),
//!     |width: &usize| {
//!         let pad = " ".repeat(*width);
//!         Ok(Formatter::from_fn(move |text| {
//!             Ok(text.lines().map(|line| format!("{pad}{line}\n")).collect())
//!         }))
//!     },
//! )?;
//! assert_eq!(indent.format("a\nb", FileContext::sentinel())?, "    a\n    b\n");
//! # Ok::<(), lustre_step::StepError>(())
//! ```

mod context;
mod error;
mod fingerprint;
mod formatter;
mod lazy;
mod lint;
mod step;
#[cfg(feature = "telemetry")]
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod harness;

pub use context::{FileContext, SENTINEL_MESSAGE, check_not_sentinel};
pub use error::{BoxError, StepError};
pub use fingerprint::{StateFingerprint, StepKind};
pub use formatter::{Formatter, FormatterFunc};
pub use lazy::LazyState;
pub use lint::Lint;
pub use step::{FileFilter, FilteredStep, FormatterStep, StandardStep, Step, VolatileStep};

#[cfg(test)]
mod tests;
