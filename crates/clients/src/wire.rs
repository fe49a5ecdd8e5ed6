//! Request and error bodies exchanged with the inventory collaborator.

use common::Direction;
use serde::{Deserialize, Serialize};

/// Body of `PATCH /inventory/{product_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStockRequest {
    pub quantity: u32,
    pub direction: Direction,
}

/// Error body returned by the services on any non-2xx answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_request_uses_movement_names() {
        let body = AdjustStockRequest {
            quantity: 4,
            direction: Direction::Outbound,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"quantity": 4, "direction": "SALIDA"}));
    }
}
