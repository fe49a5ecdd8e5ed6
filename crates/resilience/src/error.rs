//! Failure types for guarded calls.

use thiserror::Error;

/// A connectivity failure: the dependency could not be reached or did not
/// answer. These are the only failures that are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransientError {
    message: String,
}

impl TransientError {
    /// Creates a transient error with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of a single failed attempt of an outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError<E> {
    /// Connectivity failure; eligible for retry and counted by the breaker.
    Transient(TransientError),

    /// Well-formed negative answer from the dependency; surfaced as-is.
    Permanent(E),
}

impl<E> CallError<E> {
    /// Shorthand for a transient failure.
    pub fn transient(message: impl Into<String>) -> Self {
        CallError::Transient(TransientError::new(message))
    }

    /// Returns true if the failure is a connectivity failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, CallError::Transient(_))
    }
}

/// Failure of a call made through [`Resilience::execute`](crate::Resilience::execute).
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// The breaker is open; the call was rejected without touching the network.
    #[error("circuit open for {dependency}")]
    CircuitOpen { dependency: String },

    /// Every attempt failed with a connectivity error. `source` is the last
    /// attempt's failure, unchanged.
    #[error("{dependency} unreachable after {attempts} attempts: {source}")]
    Exhausted {
        dependency: String,
        attempts: u32,
        source: TransientError,
    },

    /// The dependency answered with a business failure.
    #[error("{0}")]
    Rejected(E),
}

impl<E> ResilienceError<E> {
    /// Returns true if the dependency should be treated as unavailable
    /// (open circuit or exhausted retries).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ResilienceError::CircuitOpen { .. } | ResilienceError::Exhausted { .. }
        )
    }

    /// Returns the business failure, if that is what this error carries.
    pub fn into_rejection(self) -> Option<E> {
        match self {
            ResilienceError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_covers_open_and_exhausted() {
        let open: ResilienceError<String> = ResilienceError::CircuitOpen {
            dependency: "catalog".to_string(),
        };
        let exhausted: ResilienceError<String> = ResilienceError::Exhausted {
            dependency: "catalog".to_string(),
            attempts: 3,
            source: TransientError::new("connection refused"),
        };
        let rejected = ResilienceError::Rejected("not found".to_string());

        assert!(open.is_unavailable());
        assert!(exhausted.is_unavailable());
        assert!(!rejected.is_unavailable());
    }

    #[test]
    fn exhausted_message_keeps_last_failure() {
        let err: ResilienceError<String> = ResilienceError::Exhausted {
            dependency: "inventory".to_string(),
            attempts: 3,
            source: TransientError::new("connection refused"),
        };
        assert_eq!(
            err.to_string(),
            "inventory unreachable after 3 attempts: connection refused"
        );
    }

    #[test]
    fn into_rejection_only_returns_business_failures() {
        assert_eq!(
            ResilienceError::Rejected(404).into_rejection(),
            Some(404)
        );
        let open: ResilienceError<u16> = ResilienceError::CircuitOpen {
            dependency: "catalog".to_string(),
        };
        assert_eq!(open.into_rejection(), None);
    }

    #[test]
    fn call_error_classification() {
        assert!(CallError::<()>::transient("timeout").is_transient());
        assert!(!CallError::Permanent(()).is_transient());
    }
}
