//! Error types for formatter step operations.
//!
//! Every failure surfaces to the immediate caller. Lazily evaluated phases
//! (state computation and formatter construction) never cache a failure, so a
//! later call retries the same computation.

use thiserror::Error;

/// Boxed error produced by state computations, formatter builders and
/// formatting engines.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by formatter steps.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    /// A required input was missing or unusable.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated precondition.
        message: String,
    },

    /// The step's state computation failed. Nothing was cached.
    #[error("step '{step}' failed to compute its state: {source}")]
    StateComputation {
        /// Name of the step.
        step: String,
        /// Failure reported by the computation.
        #[source]
        source: BoxError,
    },

    /// The formatter builder failed. The state stays cached.
    #[error("step '{step}' failed to build its formatter: {source}")]
    FunctionBuild {
        /// Name of the step.
        step: String,
        /// Failure reported by the builder.
        #[source]
        source: BoxError,
    },

    /// The formatter itself failed on this input. The cached formatter
    /// remains valid.
    #[error("formatter failed: {source}")]
    Transform {
        /// Failure reported by the formatting engine.
        #[source]
        source: BoxError,
    },

    /// The step's state could not be serialised for fingerprinting.
    #[error("step '{step}' state could not be serialised: {source}")]
    Serialization {
        /// Name of the step.
        step: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

impl StepError {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Wraps a formatting engine failure.
    #[must_use]
    pub fn transform(source: impl Into<BoxError>) -> Self {
        Self::Transform {
            source: source.into(),
        }
    }

    pub(crate) fn state_computation(step: &str, source: BoxError) -> Self {
        Self::StateComputation {
            step: step.to_owned(),
            source,
        }
    }

    pub(crate) fn function_build(step: &str, source: BoxError) -> Self {
        Self::FunctionBuild {
            step: step.to_owned(),
            source,
        }
    }

    pub(crate) fn serialization(step: &str, source: serde_json::Error) -> Self {
        Self::Serialization {
            step: step.to_owned(),
            source,
        }
    }

    /// Returns `true` for [`StepError::InvalidArgument`].
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` when a lazy phase failed and a later call may retry it.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StateComputation { .. } | Self::FunctionBuild { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_computation_names_step_and_cause() {
        let error = StepError::state_computation("prettier", "engine missing".into());
        let message = error.to_string();
        assert!(message.contains("prettier"));
        assert!(message.contains("engine missing"));
        assert!(error.is_retryable());
    }

    #[test]
    fn transform_keeps_source_chain() {
        let io = std::io::Error::other("disk full");
        let error = StepError::transform(io);
        let source = std::error::Error::source(&error).expect("source");
        assert_eq!(source.to_string(), "disk full");
        assert!(!error.is_retryable());
    }

    #[test]
    fn invalid_argument_is_flagged() {
        let error = StepError::invalid_argument("name is empty");
        assert!(error.is_invalid_argument());
        assert_eq!(error.to_string(), "invalid argument: name is empty");
    }
}
