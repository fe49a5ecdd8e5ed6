//! Order fulfillment saga.
//!
//! Creating an order runs three steps in sequence:
//! 1. Validate the product against the catalog
//! 2. Reserve stock with an outbound adjustment
//! 3. Persist the order as `PENDING`
//!
//! If persisting fails after stock was reserved, the reservation is returned
//! with an inbound adjustment. Cancelling an order returns its stock before
//! the new state is saved.

pub mod coordinator;
pub mod error;
pub mod order_fulfillment;
mod order_locks;
pub mod state;

pub use coordinator::OrderSaga;
pub use error::{ErrorKind, SagaError};
pub use state::SagaState;
