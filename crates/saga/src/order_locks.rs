//! Per-order serialization of state changes.

use std::collections::HashMap;
use std::sync::Arc;

use common::OrderId;
use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

/// One async lock per order with a state change in flight.
///
/// A holder keeps the lock across loading the order, returning its stock and
/// saving the new state, so two changes of the same order never interleave.
/// Entries are dropped once nobody holds or waits for them.
#[derive(Debug, Default)]
pub(crate) struct OrderLocks {
    slots: Arc<Mutex<HashMap<OrderId, Slot>>>,
}

impl OrderLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits until no other change of `order_id` is running.
    pub(crate) async fn lock(&self, order_id: OrderId) -> OrderGuard {
        let slot = self.slots.lock().entry(order_id).or_default().clone();
        let guard = slot.lock_owned().await;
        OrderGuard {
            order_id,
            slots: self.slots.clone(),
            guard: Some(guard),
        }
    }

    /// Returns the number of orders with a lock entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Held for the duration of one order state change.
pub(crate) struct OrderGuard {
    order_id: OrderId,
    slots: Arc<Mutex<HashMap<OrderId, Slot>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for OrderGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        self.guard.take();
        // Only the map still references the slot: nobody is waiting.
        if slots
            .get(&self.order_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.order_id);
        }
    }
}
