//! Lint findings reported by formatters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StepError;

/// A single problem reported by a formatter's lint pass.
///
/// Line numbers are one-based and inclusive. A finding that cannot be tied to
/// a line carries no line range.
///
/// # Example
///
/// ```
/// use lustre_step::Lint;
///
/// let lint = Lint::at_line(3, "no-tabs", "tab character found")?;
/// assert_eq!(lint.line_start(), Some(3));
/// assert_eq!(lint.to_string(), "L3 no-tabs: tab character found");
/// # Ok::<(), lustre_step::StepError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lines: Option<LineRange>,
    rule_id: String,
    detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct LineRange {
    start: u32,
    end: u32,
}

impl Lint {
    /// Creates a finding not tied to any line.
    #[must_use]
    pub fn at_undefined_line(rule_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            lines: None,
            rule_id: rule_id.into(),
            detail: detail.into(),
        }
    }

    /// Creates a finding on a single line.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if `line` is zero.
    pub fn at_line(
        line: u32,
        rule_id: impl Into<String>,
        detail: impl Into<String>,
    ) -> Result<Self, StepError> {
        Self::at_line_range(line, line, rule_id, detail)
    }

    /// Creates a finding spanning `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidArgument`] if `start` is zero or `end`
    /// precedes `start`.
    pub fn at_line_range(
        start: u32,
        end: u32,
        rule_id: impl Into<String>,
        detail: impl Into<String>,
    ) -> Result<Self, StepError> {
        if start == 0 {
            return Err(StepError::invalid_argument("lint lines are one-based"));
        }
        if end < start {
            return Err(StepError::invalid_argument(format!(
                "lint line range {start}-{end} ends before it starts"
            )));
        }
        Ok(Self {
            lines: Some(LineRange { start, end }),
            rule_id: rule_id.into(),
            detail: detail.into(),
        })
    }

    /// Returns the first affected line, if known.
    #[must_use]
    pub fn line_start(&self) -> Option<u32> {
        self.lines.map(|range| range.start)
    }

    /// Returns the last affected line, if known.
    #[must_use]
    pub fn line_end(&self) -> Option<u32> {
        self.lines.map(|range| range.end)
    }

    /// Returns the identifier of the rule that fired.
    #[must_use]
    pub const fn rule_id(&self) -> &str {
        self.rule_id.as_str()
    }

    /// Returns the human-readable detail.
    #[must_use]
    pub const fn detail(&self) -> &str {
        self.detail.as_str()
    }
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lines {
            None => write!(f, "L? {}: {}", self.rule_id, self.detail),
            Some(LineRange { start, end }) if start == end => {
                write!(f, "L{start} {}: {}", self.rule_id, self.detail)
            }
            Some(LineRange { start, end }) => {
                write!(f, "L{start}-{end} {}: {}", self.rule_id, self.detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::zero_start(0, 0)]
    #[case::reversed(5, 4)]
    fn invalid_ranges_are_rejected(#[case] start: u32, #[case] end: u32) {
        let error = Lint::at_line_range(start, end, "rule", "detail").expect_err("invalid");
        assert!(error.is_invalid_argument());
    }

    #[test]
    fn display_covers_every_shape() {
        let undefined = Lint::at_undefined_line("engine", "crashed");
        let range = Lint::at_line_range(2, 4, "indent", "mixed").expect("valid range");
        assert_eq!(undefined.to_string(), "L? engine: crashed");
        assert_eq!(range.to_string(), "L2-4 indent: mixed");
        assert_eq!(range.line_end(), Some(4));
    }

    #[test]
    fn undefined_line_omits_lines_when_serialised() {
        let lint = Lint::at_undefined_line("engine", "crashed");
        let json = serde_json::to_string(&lint).expect("serialize");
        assert_eq!(json, r#"{"rule_id":"engine","detail":"crashed"}"#);
    }
}
