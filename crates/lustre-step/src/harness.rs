//! Assertion helpers for testing formatter steps.
//!
//! [`StepHarness`] drives a step with the sentinel file context, which is
//! enough for formatters that only look at text. Formatters built with
//! [`Formatter::needs_file`](crate::Formatter::needs_file) reject the
//! sentinel; test those with [`StepHarnessWithFile`].
//!
//! Every helper panics with a descriptive message on mismatch, so they read
//! like assertions inside `#[test]` functions.

use std::path::PathBuf;

use crate::context::FileContext;
use crate::error::StepError;
use crate::lint::Lint;
use crate::step::FormatterStep;

/// Drives a step with [`FileContext::sentinel`].
///
/// # Example
///
/// ```
/// use lustre_step::{Formatter, StandardStep};
/// use lustre_step::harness::StepHarness;
///
/// let step = StandardStep::new(
///     "trim",
///     || Ok(()),
///     |_state: &()| Ok(Formatter::from_fn(|text| Ok(text.trim().to_owned()))),
/// )?;
/// let harness = StepHarness::new(step);
/// harness.test("  body  ", "body");
/// harness.test_unaffected("body");
/// # Ok::<(), lustre_step::StepError>(())
/// ```
#[derive(Debug)]
pub struct StepHarness<T> {
    step: T,
}

impl<T: FormatterStep> StepHarness<T> {
    /// Wraps `step`.
    #[must_use]
    pub const fn new(step: T) -> Self {
        Self { step }
    }

    /// Returns the wrapped step.
    #[must_use]
    pub const fn step(&self) -> &T {
        &self.step
    }

    /// Asserts that `input` formats to `expected`, and that formatting
    /// `expected` again leaves it unchanged.
    ///
    /// # Panics
    ///
    /// Panics if formatting fails or either output differs.
    pub fn test(&self, input: &str, expected: &str) {
        assert_formats(&self.step, FileContext::sentinel(), input, expected);
    }

    /// Asserts that `input` is already formatted.
    ///
    /// # Panics
    ///
    /// Panics if formatting fails or changes `input`.
    pub fn test_unaffected(&self, input: &str) {
        assert_formats(&self.step, FileContext::sentinel(), input, input);
    }

    /// Lints `input` and returns the findings.
    ///
    /// # Panics
    ///
    /// Panics if the lint pass fails.
    #[must_use]
    pub fn expect_lint(&self, input: &str) -> Vec<Lint> {
        lint_or_panic(&self.step, FileContext::sentinel(), input)
    }

    /// Asserts that formatting `input` fails and returns the error.
    ///
    /// # Panics
    ///
    /// Panics if formatting succeeds.
    #[must_use]
    pub fn expect_error(&self, input: &str) -> StepError {
        error_or_panic(&self.step, FileContext::sentinel(), input)
    }
}

/// Drives a step with a real file context.
#[derive(Debug)]
pub struct StepHarnessWithFile<T> {
    step: T,
    file: FileContext,
}

impl<T: FormatterStep> StepHarnessWithFile<T> {
    /// Wraps `step`, presenting every input as read from `path`.
    #[must_use]
    pub fn new(step: T, path: impl Into<PathBuf>) -> Self {
        Self {
            step,
            file: FileContext::new(path),
        }
    }

    /// Returns the wrapped step.
    #[must_use]
    pub const fn step(&self) -> &T {
        &self.step
    }

    /// Returns the file inputs are presented as.
    #[must_use]
    pub const fn file(&self) -> &FileContext {
        &self.file
    }

    /// Asserts that `input` formats to `expected`, and that formatting
    /// `expected` again leaves it unchanged.
    ///
    /// # Panics
    ///
    /// Panics if formatting fails or either output differs.
    pub fn test(&self, input: &str, expected: &str) {
        assert_formats(&self.step, &self.file, input, expected);
    }

    /// Asserts that `input` is already formatted.
    ///
    /// # Panics
    ///
    /// Panics if formatting fails or changes `input`.
    pub fn test_unaffected(&self, input: &str) {
        assert_formats(&self.step, &self.file, input, input);
    }

    /// Lints `input` and returns the findings.
    ///
    /// # Panics
    ///
    /// Panics if the lint pass fails.
    #[must_use]
    pub fn expect_lint(&self, input: &str) -> Vec<Lint> {
        lint_or_panic(&self.step, &self.file, input)
    }

    /// Asserts that formatting `input` fails and returns the error.
    ///
    /// # Panics
    ///
    /// Panics if formatting succeeds.
    #[must_use]
    pub fn expect_error(&self, input: &str) -> StepError {
        error_or_panic(&self.step, &self.file, input)
    }
}

fn format_or_panic<T: FormatterStep>(step: &T, file: &FileContext, input: &str) -> String {
    match step.format(input, file) {
        Ok(output) => output,
        Err(error) => panic!("step '{}' failed to format: {error}", step.name()),
    }
}

fn assert_formats<T: FormatterStep>(step: &T, file: &FileContext, input: &str, expected: &str) {
    let output = format_or_panic(step, file, input);
    assert_eq!(output, expected, "step '{}' output differs", step.name());
    let again = format_or_panic(step, file, expected);
    assert_eq!(
        again,
        expected,
        "step '{}' is not idempotent on its own output",
        step.name()
    );
}

fn lint_or_panic<T: FormatterStep>(step: &T, file: &FileContext, input: &str) -> Vec<Lint> {
    match step.lint(input, file) {
        Ok(lints) => lints,
        Err(error) => panic!("step '{}' failed to lint: {error}", step.name()),
    }
}

fn error_or_panic<T: FormatterStep>(step: &T, file: &FileContext, input: &str) -> StepError {
    match step.format(input, file) {
        Ok(output) => panic!(
            "step '{}' was expected to fail but produced {output:?}",
            step.name()
        ),
        Err(error) => error,
    }
}
