use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::FormatterStep;
use crate::context::{FileContext, check_not_sentinel};
use crate::error::StepError;
use crate::fingerprint::{StateFingerprint, StepKind};
use crate::lint::Lint;

/// Accepts files by extension, compared case-insensitively.
///
/// The filter is part of the filtered step's fingerprint, so it is
/// serialisable and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileFilter {
    extensions: BTreeSet<String>,
}

impl FileFilter {
    /// Creates a filter accepting the given extensions, with or without a
    /// leading dot.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if no extensions are given, or
    /// any of them is blank or compound (`tar.gz`). Only the last component
    /// of a file name is compared, so a compound extension could never match.
    pub fn extensions<I, T>(extensions: I) -> Result<Self, StepError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut accepted = BTreeSet::new();
        for extension in extensions {
            let normalised = extension.as_ref().trim().trim_start_matches('.');
            if normalised.is_empty() {
                return Err(StepError::invalid_argument(
                    "file filter extensions must not be blank",
                ));
            }
            if normalised.contains('.') {
                return Err(StepError::invalid_argument(format!(
                    "file filter extension '{normalised}' has more than one component; \
                     use its last one instead"
                )));
            }
            accepted.insert(normalised.to_ascii_lowercase());
        }
        if accepted.is_empty() {
            return Err(StepError::invalid_argument(
                "file filter needs at least one extension",
            ));
        }
        Ok(Self {
            extensions: accepted,
        })
    }

    /// Returns `true` if `file` has an accepted extension.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] for the sentinel context, since
    /// filtering needs a real file name.
    pub fn accepts(&self, file: &FileContext) -> Result<bool, StepError> {
        check_not_sentinel(file)?;
        Ok(file
            .extension()
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase())))
    }
}

/// A step applied only to files accepted by a [`FileFilter`].
///
/// Rejected files pass through unchanged and produce no lints. The delegate's
/// formatter is not built until an accepted file arrives.
///
/// # Example
///
/// ```
/// use lustre_step::{FileContext, FileFilter, Formatter, FormatterStep, StandardStep};
///
/// let step = StandardStep::new(
///     "uppercase",
///     || Ok(1_u32),
///     |_state: &u32| Ok(Formatter::from_fn(|text| Ok(text.to_uppercase()))),
/// )?
/// .filter_by_file(FileFilter::extensions(["md"])?);
///
/// assert_eq!(step.format("abc", &FileContext::new("README.md"))?, "ABC");
/// assert_eq!(step.format("abc", &FileContext::new("main.rs"))?, "abc");
/// # Ok::<(), lustre_step::StepError>(())
/// ```
pub struct FilteredStep {
    delegate: Box<dyn FormatterStep>,
    filter: FileFilter,
}

impl FilteredStep {
    /// Wraps `delegate` so it only sees files accepted by `filter`.
    #[must_use]
    pub const fn new(delegate: Box<dyn FormatterStep>, filter: FileFilter) -> Self {
        Self { delegate, filter }
    }

    /// Returns the filter.
    #[must_use]
    pub const fn filter(&self) -> &FileFilter {
        &self.filter
    }
}

impl FormatterStep for FilteredStep {
    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn format(&self, text: &str, file: &FileContext) -> Result<String, StepError> {
        if self.filter.accepts(file)? {
            self.delegate.format(text, file)
        } else {
            Ok(text.to_owned())
        }
    }

    fn lint(&self, text: &str, file: &FileContext) -> Result<Vec<Lint>, StepError> {
        if self.filter.accepts(file)? {
            self.delegate.lint(text, file)
        } else {
            Ok(Vec::new())
        }
    }

    fn fingerprint(&self) -> Result<StateFingerprint, StepError> {
        let delegate = self.delegate.fingerprint()?;
        StateFingerprint::compute(StepKind::Filtered, &(delegate, &self.filter))
            .map_err(|source| StepError::serialization(self.delegate.name(), source))
    }

    fn dispose_function(&mut self) {
        self.delegate.dispose_function();
    }
}

impl fmt::Debug for FilteredStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredStep")
            .field("name", &self.delegate.name())
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
