//! Named, state-compared formatter steps.
//!
//! A [`Step`] binds a human-readable name to a [`LazyState`]. Its identity
//! for equality, hashing and serialisation is the computed state alone: two
//! steps with equal states are interchangeable for caching purposes no
//! matter what they are called, so renaming a step never invalidates a
//! cache.
//!
//! The executable variants build on it:
//!
//! - [`StandardStep`] derives its formatter from the state.
//! - [`VolatileStep`] carries a unique random state and is never equal to
//!   any other step.
//! - [`FilteredStep`] restricts another step to files with given extensions.
//!
//! All of them implement the object-safe [`FormatterStep`] trait so that a
//! pipeline can hold steps with different state types side by side.

mod filtered;
mod standard;
mod volatile;

use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::unsync::OnceCell;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::context::FileContext;
use crate::error::{BoxError, StepError};
use crate::fingerprint::{StateFingerprint, StepKind};
use crate::formatter::Formatter;
use crate::lazy::LazyState;
use crate::lint::Lint;

pub use filtered::{FileFilter, FilteredStep};
pub use standard::StandardStep;
pub use volatile::VolatileStep;

/// Behaviour shared by every executable step.
///
/// # Example
///
/// ```
/// use lustre_step::{FileContext, Formatter, FormatterStep, StandardStep};
///
/// let steps: Vec<Box<dyn FormatterStep>> = vec![
///     Box::new(StandardStep::new(
///         "uppercase",
///         || Ok(String::from("v1")),
///         |_state: &String| Ok(Formatter::from_fn(|text| Ok(text.to_uppercase()))),
///     )?),
/// ];
///
/// let mut text = String::from("abc");
/// for step in &steps {
///     text = step.format(&text, FileContext::sentinel())?;
/// }
/// assert_eq!(text, "ABC");
/// # Ok::<(), lustre_step::StepError>(())
/// ```
pub trait FormatterStep: Send {
    /// Returns the step's display name. Never forces state computation.
    fn name(&self) -> &str;

    /// Formats `text` read from `file`, building the formatter on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateComputation`] or
    /// [`StepError::FunctionBuild`] if a lazy phase fails, or the
    /// formatter's own error.
    fn format(&self, text: &str, file: &FileContext) -> Result<String, StepError>;

    /// Lints `text` read from `file`, building the formatter on first use.
    ///
    /// # Errors
    ///
    /// As for [`FormatterStep::format`].
    fn lint(&self, text: &str, file: &FileContext) -> Result<Vec<Lint>, StepError>;

    /// Returns the cache key for this step's state, computing it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateComputation`] if the state cannot be
    /// computed, or [`StepError::Serialization`] if it cannot be encoded.
    fn fingerprint(&self) -> Result<StateFingerprint, StepError>;

    /// Releases the cached formatter if it holds a resource. The next
    /// `format` or `lint` builds a fresh one from the cached state.
    fn dispose_function(&mut self);

    /// Restricts this step to files accepted by `filter`.
    fn filter_by_file(self, filter: FileFilter) -> FilteredStep
    where
        Self: Sized + 'static,
    {
        FilteredStep::new(Box::new(self), filter)
    }
}

/// A named unit whose identity is its lazily computed state.
pub struct Step<S> {
    name: String,
    state: LazyState<S>,
}

impl<S> Step<S> {
    /// Creates a step that computes its state on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if `name` is blank.
    pub fn new<F>(name: impl Into<String>, computation: F) -> Result<Self, StepError>
    where
        F: Fn() -> Result<S, BoxError> + Send + 'static,
    {
        Self::with_state(name.into(), LazyState::new(computation))
    }

    pub(crate) fn with_state(name: String, state: LazyState<S>) -> Result<Self, StepError> {
        if name.trim().is_empty() {
            return Err(StepError::invalid_argument("step name must not be empty"));
        }
        Ok(Self { name, state })
    }

    /// Returns the step name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the state, computing it on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateComputation`] if the computation fails.
    /// Nothing is cached, so the next call retries.
    pub fn state(&self) -> Result<&S, StepError> {
        let was_computed = self.state.is_computed();
        let state = self
            .state
            .state()
            .map_err(|source| StepError::state_computation(&self.name, source))?;
        if !was_computed {
            debug!(step = %self.name, "computed step state");
        }
        Ok(state)
    }

    /// Returns `true` once the state has been computed.
    #[must_use]
    pub fn is_state_computed(&self) -> bool {
        self.state.is_computed()
    }

    /// Compares states, computing either side if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateComputation`] for the first side that fails.
    pub fn try_eq(&self, other: &Self) -> Result<bool, StepError>
    where
        S: PartialEq,
    {
        Ok(self.state()? == other.state()?)
    }

    pub(crate) fn fingerprint(&self, kind: StepKind) -> Result<StateFingerprint, StepError>
    where
        S: Serialize,
    {
        let state = self.state()?;
        StateFingerprint::compute(kind, state)
            .map_err(|source| StepError::serialization(&self.name, source))
    }
}

impl<S: PartialEq> PartialEq for Step<S> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl<S: Hash> Hash for Step<S> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.state.hash(hasher);
    }
}

impl<S: Serialize> Serialize for Step<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.state.serialize(serializer)
    }
}

impl<S: fmt::Debug> fmt::Debug for Step<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish()
    }
}

/// Lazily built formatter owned by a single step.
///
/// The formatter is derived from state that has already been computed and
/// cached, so the two phases are memoised independently: disposing the
/// formatter never discards the state.
#[derive(Debug, Default)]
pub(crate) struct FormatterSlot {
    formatter: OnceCell<Formatter>,
}

impl FormatterSlot {
    pub(crate) fn get_or_build<F>(&self, step: &str, build: F) -> Result<&Formatter, StepError>
    where
        F: FnOnce() -> Result<Formatter, StepError>,
    {
        self.formatter.get_or_try_init(|| {
            let formatter = build()?;
            debug!(
                step,
                closeable = formatter.is_closeable(),
                "built formatter function"
            );
            Ok(formatter)
        })
    }

    pub(crate) fn is_built(&self) -> bool {
        self.formatter.get().is_some()
    }

    /// Closes and clears a closeable formatter. Plain formatters stay cached.
    pub(crate) fn dispose(&mut self, step: &str) {
        if !self.formatter.get().is_some_and(Formatter::is_closeable) {
            return;
        }
        if let Some(formatter) = self.formatter.take() {
            formatter.close();
            debug!(step, "released formatter function");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use rstest::rstest;

    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn blank_names_are_rejected(#[case] name: &str) {
        let error = Step::new(name, || Ok(1_u8)).expect_err("blank name");
        assert!(error.is_invalid_argument());
    }

    #[test]
    fn name_never_forces_state() {
        let step = Step::new("lazy", || Ok(1_u8)).expect("step");
        assert_eq!(step.name(), "lazy");
        assert!(!step.is_state_computed());
    }

    #[test]
    fn equality_ignores_name() {
        let first = Step::new("first", || Ok(String::from("v1"))).expect("step");
        let second = Step::new("second", || Ok(String::from("v1"))).expect("step");
        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));
    }

    #[test]
    fn unequal_states_are_unequal() {
        let first = Step::new("same", || Ok(1_u32)).expect("step");
        let second = Step::new("same", || Ok(2_u32)).expect("step");
        assert_ne!(first, second);
    }

    #[test]
    fn state_failure_names_the_step() {
        let step: Step<u32> = Step::new("ktlint", || Err("jar missing".into())).expect("step");
        let error = step.state().expect_err("computation fails");
        assert!(matches!(error, StepError::StateComputation { step: ref name, .. } if name == "ktlint"));
        assert!(error.is_retryable());
    }

    #[test]
    fn serialisation_excludes_name() {
        let step = Step::new("renamed", || Ok(vec!["a", "b"])).expect("step");
        let json = serde_json::to_string(&step).expect("serialize");
        assert_eq!(json, r#"["a","b"]"#);
    }
}
