//! File context handed to formatters alongside the text they transform.
//!
//! Test harnesses that exercise step logic without touching the filesystem
//! pass [`FileContext::sentinel`], a single process-wide placeholder.
//! Formatters that genuinely need the underlying file reject it through
//! [`check_not_sentinel`].

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

use crate::error::StepError;

/// Message carried by the error returned from [`check_not_sentinel`].
pub const SENTINEL_MESSAGE: &str =
    "This step requires the underlying file. If this is a test, use StepHarnessWithFile";

static SENTINEL: Lazy<FileContext> = Lazy::new(|| FileContext {
    path: PathBuf::new(),
});

/// The file a piece of text was read from.
///
/// # Example
///
/// ```
/// use lustre_step::FileContext;
///
/// let file = FileContext::new("src/main.rs");
/// assert_eq!(file.extension(), Some("rs"));
/// assert!(!file.is_sentinel());
/// assert!(FileContext::sentinel().is_sentinel());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileContext {
    path: PathBuf,
}

impl FileContext {
    /// Creates a context for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the shared placeholder meaning "no real file is available".
    #[must_use]
    pub fn sentinel() -> &'static Self {
        Lazy::force(&SENTINEL)
    }

    /// Returns `true` only for the shared placeholder instance itself.
    ///
    /// The check is by address. A context built with the same (empty) path
    /// compares equal by value but is not the sentinel, and must never be
    /// treated as one.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        std::ptr::eq(self, Self::sentinel())
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Returns the file extension, if it is valid UTF-8.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

/// Fails with [`StepError::InvalidArgument`] when `file` is the sentinel.
///
/// # Errors
///
/// Returns an invalid argument error carrying [`SENTINEL_MESSAGE`] if `file`
/// is the instance returned by [`FileContext::sentinel`].
pub fn check_not_sentinel(file: &FileContext) -> Result<(), StepError> {
    if file.is_sentinel() {
        return Err(StepError::invalid_argument(SENTINEL_MESSAGE));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_a_singleton() {
        assert!(std::ptr::eq(FileContext::sentinel(), FileContext::sentinel()));
    }

    #[test]
    fn guard_rejects_sentinel_with_harness_hint() {
        let error = check_not_sentinel(FileContext::sentinel()).expect_err("sentinel rejected");
        assert!(error.is_invalid_argument());
        assert!(error.to_string().contains("requires the underlying file"));
        assert!(error.to_string().contains("StepHarnessWithFile"));
    }

    #[test]
    fn value_equal_context_passes_guard() {
        let lookalike = FileContext::new("");
        assert_eq!(&lookalike, FileContext::sentinel());
        assert!(check_not_sentinel(&lookalike).is_ok());
    }

    #[test]
    fn cloned_sentinel_is_not_the_sentinel() {
        let copy = FileContext::sentinel().clone();
        assert!(!copy.is_sentinel());
        assert!(check_not_sentinel(&copy).is_ok());
    }
}
