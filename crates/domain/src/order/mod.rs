//! Orders and their lifecycle.

mod record;
mod state;

pub use record::{NewOrder, Order};
pub use state::{OrderState, Transition};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The requested state is not a known order state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The transition is forbidden by the order lifecycle.
    #[error("{reason}")]
    IllegalTransition {
        from: OrderState,
        to: OrderState,
        reason: &'static str,
    },

    /// Order quantity must be a positive number of units.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },
}
