//! Order fulfillment saga constants.

/// Flow label: create an order.
pub const FLOW_CREATE_ORDER: &str = "create_order";

/// Flow label: change an order's state.
pub const FLOW_MODIFY_ORDER: &str = "modify_order";

/// Step name: Check the product exists in the catalog.
pub const STEP_VALIDATE_PRODUCT: &str = "validate_product";

/// Step name: Take the ordered quantity out of stock.
pub const STEP_RESERVE_STOCK: &str = "reserve_stock";

/// Step name: Store the order.
pub const STEP_PERSIST_ORDER: &str = "persist_order";

/// Step name: Check the requested state change.
pub const STEP_VALIDATE_TRANSITION: &str = "validate_transition";

/// Step name: Put a cancelled or reverted order's quantity back into stock.
pub const STEP_RESTORE_STOCK: &str = "restore_stock";

/// Step name: Store the order's new state.
pub const STEP_UPDATE_STATE: &str = "update_state";
