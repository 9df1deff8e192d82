//! Error types for Switchyard

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderError;
use crate::routing::{CapabilityId, TaskCategory};

/// Result type alias using Switchyard's Error
pub type Result<T> = std::result::Result<T, Error>;

/// One failed attempt against a single capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptFailure {
    /// The capability that was tried
    pub capability: CapabilityId,
    /// Wall-clock time until the failure was observed
    pub latency_ms: f64,
    /// The adapter-side error
    pub error: ProviderError,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} failed after {:.0}ms: {}",
            self.capability, self.latency_ms, self.error
        )
    }
}

/// Switchyard error types
#[derive(Error, Debug)]
pub enum Error {
    // Routing errors (E1100-E1199)
    #[error("No capability registered for task category '{0}'")]
    NoCapabilityForCategory(TaskCategory),

    #[error("Capability '{provider}/{model}' is already registered")]
    DuplicateCapability { provider: String, model: String },

    // Execution errors (E1200-E1299)
    #[error("Provider execution failed: {0}")]
    ProviderExecutionFailed(AttemptFailure),

    #[error("Execution exhausted after {attempts} attempt(s). First failure: {primary}. Last failure: {last}")]
    ExecutionExhausted {
        primary: AttemptFailure,
        last: AttemptFailure,
        attempts: usize,
    },

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCapabilityForCategory(_) => "E1101",
            Self::DuplicateCapability { .. } => "E1102",
            Self::ProviderExecutionFailed(_) => "E1201",
            Self::ExecutionExhausted { .. } => "E1202",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
        }
    }

    /// Whether the caller should treat this error as final for the task.
    ///
    /// A single `ProviderExecutionFailed` is recovered by the executor's
    /// fallback and never reaches the caller on its own.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::ProviderExecutionFailed(_))
    }

    /// The failed attempts carried by this error, oldest first
    pub fn attempt_failures(&self) -> Vec<&AttemptFailure> {
        match self {
            Self::ProviderExecutionFailed(failure) => vec![failure],
            Self::ExecutionExhausted {
                primary,
                last,
                attempts,
            } if *attempts > 1 => vec![primary, last],
            Self::ExecutionExhausted { primary, .. } => vec![primary],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(model: &str) -> AttemptFailure {
        AttemptFailure {
            capability: CapabilityId::new("acme", model),
            latency_ms: 12.0,
            error: ProviderError::Request("connection reset".to_string()),
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::NoCapabilityForCategory(TaskCategory::Summarization).code(),
            "E1101"
        );
        assert_eq!(
            Error::DuplicateCapability {
                provider: "acme".to_string(),
                model: "m1".to_string(),
            }
            .code(),
            "E1102"
        );
        assert_eq!(Error::ConfigError("bad".to_string()).code(), "E600");
    }

    #[test]
    fn test_duplicate_message() {
        let err = Error::DuplicateCapability {
            provider: "acme".to_string(),
            model: "m1".to_string(),
        };
        assert_eq!(err.to_string(), "Capability 'acme/m1' is already registered");
    }

    #[test]
    fn test_exhausted_carries_both_failures() {
        let err = Error::ExecutionExhausted {
            primary: failure("m1"),
            last: failure("m2"),
            attempts: 2,
        };

        let message = err.to_string();
        assert!(message.contains("acme/m1"));
        assert!(message.contains("acme/m2"));
        assert!(err.is_terminal());
        assert_eq!(err.attempt_failures().len(), 2);
    }

    #[test]
    fn test_single_attempt_exhaustion() {
        let err = Error::ExecutionExhausted {
            primary: failure("m1"),
            last: failure("m1"),
            attempts: 1,
        };
        assert_eq!(err.attempt_failures().len(), 1);
    }

    #[test]
    fn test_provider_failure_is_not_terminal() {
        let err = Error::ProviderExecutionFailed(failure("m1"));
        assert!(!err.is_terminal());
    }
}
