//! Order domain for the fulfillment services.
//!
//! This crate provides:
//! - `OrderState` and the transition rules between states
//! - the `Order` record and its creation rules
//! - `OrderRepository` with in-memory and PostgreSQL implementations

pub mod error;
pub mod order;
pub mod repository;

pub use error::RepositoryError;
pub use order::{NewOrder, Order, OrderError, OrderState, Transition};
pub use repository::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
