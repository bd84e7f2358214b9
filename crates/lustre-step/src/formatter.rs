//! Formatter functions built from step state.
//!
//! A [`FormatterFunc`] is the executable half of a step: it turns text into
//! text and may report lint findings. Builders wrap it in a [`Formatter`],
//! which always carries a release operation. For plain functions the release
//! is a no-op; for functions backed by an engine resource it frees that
//! resource exactly once, either on explicit disposal or when the formatter
//! is dropped.

use std::fmt;

use crate::context::{FileContext, check_not_sentinel};
use crate::error::{BoxError, StepError};
use crate::lint::Lint;

/// A text transformation with an optional lint pass.
pub trait FormatterFunc: Send {
    /// Transforms `text` read from `file`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Transform`] when the engine fails, or
    /// [`StepError::InvalidArgument`] when `file` is unusable.
    fn apply(&self, text: &str, file: &FileContext) -> Result<String, StepError>;

    /// Reports problems in `text` read from `file`. Reports nothing by
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Transform`] when the engine fails.
    fn lint(&self, _text: &str, _file: &FileContext) -> Result<Vec<Lint>, StepError> {
        Ok(Vec::new())
    }
}

struct TextFn<F>(F);

impl<F> FormatterFunc for TextFn<F>
where
    F: Fn(&str) -> Result<String, BoxError> + Send,
{
    fn apply(&self, text: &str, _file: &FileContext) -> Result<String, StepError> {
        (self.0)(text).map_err(StepError::transform)
    }
}

struct FileFn<F>(F);

impl<F> FormatterFunc for FileFn<F>
where
    F: Fn(&str, &FileContext) -> Result<String, BoxError> + Send,
{
    fn apply(&self, text: &str, file: &FileContext) -> Result<String, StepError> {
        check_not_sentinel(file)?;
        (self.0)(text, file).map_err(StepError::transform)
    }
}

type Release = Box<dyn FnOnce() + Send>;

/// A formatter function together with its release operation.
///
/// # Example
///
/// ```
/// use lustre_step::{FileContext, Formatter};
///
/// let formatter = Formatter::from_fn(|text| Ok(text.trim_end().to_owned()));
/// let output = formatter.apply("fn main() {}   ", FileContext::sentinel())?;
/// assert_eq!(output, "fn main() {}");
/// assert!(!formatter.is_closeable());
/// # Ok::<(), lustre_step::StepError>(())
/// ```
pub struct Formatter {
    func: Box<dyn FormatterFunc>,
    release: Option<Release>,
}

impl Formatter {
    /// Wraps a formatter function that holds no resources.
    #[must_use]
    pub fn new(func: impl FormatterFunc + 'static) -> Self {
        Self {
            func: Box::new(func),
            release: None,
        }
    }

    /// Wraps a function of the text alone. The file is ignored.
    #[must_use]
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(&str) -> Result<String, BoxError> + Send + 'static,
    {
        Self::new(TextFn(func))
    }

    /// Wraps a function that needs the real file.
    ///
    /// The sentinel context is rejected with [`StepError::InvalidArgument`]
    /// before `func` runs.
    #[must_use]
    pub fn needs_file<F>(func: F) -> Self
    where
        F: Fn(&str, &FileContext) -> Result<String, BoxError> + Send + 'static,
    {
        Self::new(FileFn(func))
    }

    /// Wraps a function backed by a resource that `release` frees.
    #[must_use]
    pub fn closeable(
        func: impl FormatterFunc + 'static,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            func: Box::new(func),
            release: Some(Box::new(release)),
        }
    }

    /// Returns `true` if this formatter still holds a resource to release.
    #[must_use]
    pub const fn is_closeable(&self) -> bool {
        self.release.is_some()
    }

    /// Delegates to [`FormatterFunc::apply`].
    ///
    /// # Errors
    ///
    /// Propagates the function's error unchanged.
    pub fn apply(&self, text: &str, file: &FileContext) -> Result<String, StepError> {
        self.func.apply(text, file)
    }

    /// Delegates to [`FormatterFunc::lint`].
    ///
    /// # Errors
    ///
    /// Propagates the function's error unchanged.
    pub fn lint(&self, text: &str, file: &FileContext) -> Result<Vec<Lint>, StepError> {
        self.func.lint(text, file)
    }

    /// Releases the underlying resource, if any, and drops the formatter.
    pub fn close(mut self) {
        self.release_resources();
    }

    fn release_resources(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Formatter {
    fn drop(&mut self) {
        self.release_resources();
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("closeable", &self.is_closeable())
            .finish_non_exhaustive()
    }
}
