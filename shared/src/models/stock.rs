//! Warehouse stock snapshot models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-(item, warehouse) stock ledger snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BinSnapshot {
    /// On-hand quantity
    pub actual_qty: Decimal,
    /// On-hand plus incoming minus committed
    pub projected_qty: Decimal,
}

impl BinSnapshot {
    pub fn new(actual_qty: Decimal, projected_qty: Decimal) -> Self {
        Self {
            actual_qty,
            projected_qty,
        }
    }

    /// A missing bin record means no stock, not an error
    pub fn or_empty(bin: Option<BinSnapshot>) -> Self {
        bin.unwrap_or_default()
    }
}
