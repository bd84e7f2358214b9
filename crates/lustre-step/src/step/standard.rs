use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use super::{FormatterSlot, FormatterStep, Step};
use crate::context::FileContext;
use crate::error::{BoxError, StepError};
use crate::fingerprint::{StateFingerprint, StepKind};
use crate::formatter::Formatter;
use crate::lazy::LazyState;
use crate::lint::Lint;

type FunctionBuilder<S> = Box<dyn Fn(&S) -> Result<Formatter, BoxError> + Send>;

/// A step whose formatter is derived from its state.
///
/// Construction is cheap: neither the state nor the formatter is computed
/// until the first `format`, `lint`, comparison or fingerprint. The state
/// always completes before the builder runs, and each phase runs once.
///
/// # Example
///
/// ```
/// use lustre_step::{FileContext, Formatter, FormatterStep, StandardStep};
///
/// let step = StandardStep::new(
///     "uppercase",
///     || Ok(String::from("v1")),
///     |_state: &String| Ok(Formatter::from_fn(|text| Ok(text.to_uppercase()))),
/// )?;
/// assert!(!step.is_function_built());
/// assert_eq!(step.format("abc", FileContext::sentinel())?, "ABC");
/// assert!(step.is_function_built());
/// # Ok::<(), lustre_step::StepError>(())
/// ```
pub struct StandardStep<S> {
    step: Step<S>,
    builder: FunctionBuilder<S>,
    formatter: FormatterSlot,
}

impl<S> StandardStep<S> {
    /// Creates a step from a state computation and a formatter builder.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if `name` is blank.
    pub fn new<C, B>(name: impl Into<String>, computation: C, builder: B) -> Result<Self, StepError>
    where
        C: Fn() -> Result<S, BoxError> + Send + 'static,
        B: Fn(&S) -> Result<Formatter, BoxError> + Send + 'static,
    {
        Ok(Self::from_step(Step::new(name, computation)?, builder))
    }

    /// Creates a step whose state is already known. Only the formatter is
    /// built lazily.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if `name` is blank.
    pub fn from_state<B>(name: impl Into<String>, state: S, builder: B) -> Result<Self, StepError>
    where
        B: Fn(&S) -> Result<Formatter, BoxError> + Send + 'static,
    {
        let step = Step::with_state(name.into(), LazyState::ready(state))?;
        Ok(Self::from_step(step, builder))
    }

    fn from_step<B>(step: Step<S>, builder: B) -> Self
    where
        B: Fn(&S) -> Result<Formatter, BoxError> + Send + 'static,
    {
        Self {
            step,
            builder: Box::new(builder),
            formatter: FormatterSlot::default(),
        }
    }

    /// Returns the underlying named step.
    #[must_use]
    pub const fn step(&self) -> &Step<S> {
        &self.step
    }

    /// Returns the state, computing it on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateComputation`] if the computation fails.
    pub fn state(&self) -> Result<&S, StepError> {
        self.step.state()
    }

    /// Returns `true` once the formatter has been built and is still cached.
    #[must_use]
    pub fn is_function_built(&self) -> bool {
        self.formatter.is_built()
    }

    fn func(&self) -> Result<&Formatter, StepError> {
        self.formatter.get_or_build(self.step.name(), || {
            let state = self.step.state()?;
            (self.builder)(state)
                .map_err(|source| StepError::function_build(self.step.name(), source))
        })
    }
}

impl<S: Serialize + Send> FormatterStep for StandardStep<S> {
    fn name(&self) -> &str {
        self.step.name()
    }

    fn format(&self, text: &str, file: &FileContext) -> Result<String, StepError> {
        self.func()?.apply(text, file)
    }

    fn lint(&self, text: &str, file: &FileContext) -> Result<Vec<Lint>, StepError> {
        self.func()?.lint(text, file)
    }

    fn fingerprint(&self) -> Result<StateFingerprint, StepError> {
        self.step.fingerprint(StepKind::Standard)
    }

    fn dispose_function(&mut self) {
        self.formatter.dispose(self.step.name());
    }
}

impl<S: PartialEq> PartialEq for StandardStep<S> {
    fn eq(&self, other: &Self) -> bool {
        self.step == other.step
    }
}

impl<S: Hash> Hash for StandardStep<S> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.step.hash(hasher);
    }
}

impl<S: Serialize> Serialize for StandardStep<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.step.serialize(serializer)
    }
}

impl<S: fmt::Debug> fmt::Debug for StandardStep<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardStep")
            .field("step", &self.step)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}
