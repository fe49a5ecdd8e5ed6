//! Stock record and adjustment direction shared by the ledger and its clients.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, StockRecordId};

/// Direction of a stock adjustment.
///
/// On the wire the inventory service uses the movement names `ENTRADA`
/// (inbound) and `SALIDA` (outbound).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Stock returns to the ledger (a return or a compensation).
    #[serde(rename = "ENTRADA")]
    Inbound,

    /// Stock leaves the ledger (a sale).
    #[serde(rename = "SALIDA")]
    Outbound,
}

impl Direction {
    /// Returns the wire name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "ENTRADA",
            Direction::Outbound => "SALIDA",
        }
    }

    /// Returns the direction that undoes this one.
    pub fn reverse(&self) -> Self {
        match self {
            Direction::Inbound => Direction::Outbound,
            Direction::Outbound => Direction::Inbound,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown movement name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid movement type: {0}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTRADA" => Ok(Direction::Inbound),
            "SALIDA" => Ok(Direction::Outbound),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Stock held for a single product.
///
/// There is at most one record per product and `quantity` is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: StockRecordId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}
