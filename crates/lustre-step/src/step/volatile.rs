use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Serialize, Serializer};

use super::{FormatterSlot, FormatterStep, Step};
use crate::context::FileContext;
use crate::error::{BoxError, StepError};
use crate::fingerprint::{StateFingerprint, StepKind};
use crate::formatter::Formatter;
use crate::lazy::LazyState;
use crate::lint::Lint;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Random nonce plus a process-wide sequence number. The sequence keeps two
/// instances in one process apart even if their nonces collide; the nonce
/// keeps runs apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
struct Uniqueness {
    nonce: u64,
    sequence: u64,
}

impl Uniqueness {
    fn draw() -> Self {
        Self {
            nonce: rand::thread_rng().r#gen(),
            sequence: SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }
}

type FormatterSupplier = Box<dyn Fn() -> Result<Formatter, BoxError> + Send>;

/// A step that is never up to date.
///
/// Its state is unique per instance, so it equals itself and nothing else,
/// and its fingerprint never repeats. Use it for formatters whose output
/// depends on something other than their declared configuration. The
/// formatter comes from a supplier that ignores the state.
///
/// # Example
///
/// ```
/// use lustre_step::{FormatterStep, VolatileStep};
///
/// let first = VolatileStep::from_fn("stamp", |text| Ok(text.to_owned()))?;
/// let second = VolatileStep::from_fn("stamp", |text| Ok(text.to_owned()))?;
/// assert!(first == first);
/// assert!(first != second);
/// assert_ne!(first.fingerprint()?, second.fingerprint()?);
/// # Ok::<(), lustre_step::StepError>(())
/// ```
pub struct VolatileStep {
    step: Step<Uniqueness>,
    supplier: FormatterSupplier,
    formatter: FormatterSlot,
}

impl VolatileStep {
    /// Creates a step whose formatter is produced lazily by `supplier`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if `name` is blank.
    pub fn new<F>(name: impl Into<String>, supplier: F) -> Result<Self, StepError>
    where
        F: Fn() -> Result<Formatter, BoxError> + Send + 'static,
    {
        let step = Step::with_state(name.into(), LazyState::ready(Uniqueness::draw()))?;
        Ok(Self {
            step,
            supplier: Box::new(supplier),
            formatter: FormatterSlot::default(),
        })
    }

    /// Creates a step from a plain text function.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if `name` is blank.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Result<Self, StepError>
    where
        F: Fn(&str) -> Result<String, BoxError> + Clone + Send + 'static,
    {
        Self::new(name, move || Ok(Formatter::from_fn(func.clone())))
    }

    /// Returns `true` once the formatter has been built and is still cached.
    #[must_use]
    pub fn is_function_built(&self) -> bool {
        self.formatter.is_built()
    }

    fn func(&self) -> Result<&Formatter, StepError> {
        self.formatter.get_or_build(self.step.name(), || {
            (self.supplier)().map_err(|source| StepError::function_build(self.step.name(), source))
        })
    }
}

impl FormatterStep for VolatileStep {
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
        self.step.fingerprint(StepKind::Volatile)
    }

    fn dispose_function(&mut self) {
        self.formatter.dispose(self.step.name());
    }
}

impl PartialEq for VolatileStep {
    fn eq(&self, other: &Self) -> bool {
        self.step == other.step
    }
}

impl Hash for VolatileStep {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.step.hash(hasher);
    }
}

impl Serialize for VolatileStep {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.step.serialize(serializer)
    }
}

impl fmt::Debug for VolatileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolatileStep")
            .field("step", &self.step)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}
