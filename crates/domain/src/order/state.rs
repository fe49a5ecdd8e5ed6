//! Order state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Completed
///           │
///           └──► Cancelled
/// ```
///
/// Staying in the same state is always allowed. Completed and Cancelled
/// cannot turn into each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderState {
    /// Stock has been reserved for the order.
    #[default]
    Pending,

    /// Order has been fulfilled.
    Completed,

    /// Order was cancelled and its stock returned.
    Cancelled,
}

/// A validated move between two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderState,
    pub to: OrderState,
}

impl Transition {
    /// Returns true if entering this state must return the order's stock.
    pub fn is_cancellation(&self) -> bool {
        self.to == OrderState::Cancelled && self.from != OrderState::Cancelled
    }
}

impl OrderState {
    /// Validates a move from this state to `target`.
    pub fn transition_to(self, target: OrderState) -> Result<Transition, OrderError> {
        let reason = match (self, target) {
            (OrderState::Cancelled, OrderState::Completed) => "cannot complete a cancelled order",
            (OrderState::Completed, OrderState::Cancelled) => "cannot cancel a completed order",
            _ => {
                return Ok(Transition {
                    from: self,
                    to: target,
                });
            }
        };
        Err(OrderError::IllegalTransition {
            from: self,
            to: target,
            reason,
        })
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Completed | OrderState::Cancelled)
    }

    /// Returns the state name as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "PENDING",
            OrderState::Completed => "COMPLETED",
            OrderState::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderState::Pending),
            "COMPLETED" => Ok(OrderState::Completed),
            "CANCELLED" => Ok(OrderState::Cancelled),
            other => Err(OrderError::InvalidState(other.to_string())),
        }
    }
}
