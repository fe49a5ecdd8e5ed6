use chrono::{DateTime, Utc};
use common::{OrderId, ProductId};
use serde::{Deserialize, Serialize};

use super::{OrderError, OrderState};

/// A persisted order.
///
/// `product_id` and `quantity` never change after creation; only `state`
/// and `updated_at` move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated order that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    product_id: ProductId,
    quantity: u32,
}

impl NewOrder {
    /// Validates an order request. Quantity must be a positive 32-bit count.
    pub fn new(product_id: ProductId, quantity: i64) -> Result<Self, OrderError> {
        match u32::try_from(quantity) {
            Ok(quantity) if quantity > 0 => Ok(Self {
                product_id,
                quantity,
            }),
            _ => Err(OrderError::InvalidQuantity { quantity }),
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Builds the stored order in `Pending` state.
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            product_id: self.product_id,
            quantity: self.quantity,
            state: OrderState::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_quantity_accepted() {
        let order = NewOrder::new(ProductId::new(7), 4).unwrap();
        assert_eq!(order.product_id(), ProductId::new(7));
        assert_eq!(order.quantity(), 4);
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert_eq!(
            NewOrder::new(ProductId::new(7), 0),
            Err(OrderError::InvalidQuantity { quantity: 0 })
        );
        assert_eq!(
            NewOrder::new(ProductId::new(7), -3),
            Err(OrderError::InvalidQuantity { quantity: -3 })
        );
        assert!(NewOrder::new(ProductId::new(7), i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_new_orders_start_pending() {
        let now = Utc::now();
        let order = NewOrder::new(ProductId::new(7), 4)
            .unwrap()
            .into_order(OrderId::new(1), now);

        assert_eq!(order.state, OrderState::Pending);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn test_order_serializes_state_by_wire_name() {
        let order = NewOrder::new(ProductId::new(7), 4)
            .unwrap()
            .into_order(OrderId::new(3), Utc::now());
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["product_id"], 7);
        assert_eq!(json["state"], "PENDING");
    }
}
