//! Saga execution state.

/// Where a single saga run currently is.
///
/// State transitions:
/// ```text
/// NotStarted ──► Running ──┬──► Completed
///                          ├──► Aborted
///                          └──► Compensating ──► Failed
/// ```
///
/// `Aborted` means a step failed before any side effect was applied, so
/// there was nothing to undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SagaState {
    /// Saga has not started yet.
    #[default]
    NotStarted,

    /// Saga steps are being executed.
    Running,

    /// A step failed after stock was taken and the stock is being returned.
    Compensating,

    /// All steps completed successfully (terminal state).
    Completed,

    /// A step failed with nothing to undo (terminal state).
    Aborted,

    /// Compensation ran after a failure (terminal state).
    Failed,
}

impl SagaState {
    /// Returns true if the saga can begin compensation.
    pub fn can_compensate(&self) -> bool {
        matches!(self, SagaState::Running)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaState::Completed | SagaState::Aborted | SagaState::Failed
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::NotStarted => "NotStarted",
            SagaState::Running => "Running",
            SagaState::Compensating => "Compensating",
            SagaState::Completed => "Completed",
            SagaState::Aborted => "Aborted",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
