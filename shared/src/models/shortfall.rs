//! Derived shortfall report models
//!
//! These rows are computed fresh on every scan and never persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::WorkOrderStatus;

/// One required item that cannot be covered from its source warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortfallRow {
    pub work_order: String,
    pub work_order_status: WorkOrderStatus,
    pub item_code: String,
    pub source_warehouse: String,
    pub target_warehouse: Option<String>,
    pub required_qty: Decimal,
    pub actual_qty: Decimal,
    pub projected_qty: Decimal,
    /// Always strictly positive
    pub shortfall: Decimal,
}

/// Shortfall rows of a single work order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortfallGroup {
    pub work_order: String,
    pub work_order_status: WorkOrderStatus,
    pub rows: Vec<ShortfallRow>,
}

impl ShortfallGroup {
    pub fn total_shortfall(&self) -> Decimal {
        self.rows.iter().map(|r| r.shortfall).sum()
    }
}

/// Result of a shortfall scan, groups in work order listing order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortfallReport {
    pub generated_at: DateTime<Utc>,
    pub groups: Vec<ShortfallGroup>,
}

impl ShortfallReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &ShortfallRow> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }

    pub fn group(&self, work_order: &str) -> Option<&ShortfallGroup> {
        self.groups.iter().find(|g| g.work_order == work_order)
    }
}

/// Current status of one line of a draft shortfall request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftReportLine {
    pub item_code: String,
    /// Source warehouse of the matching work order item, or "N/A"
    pub source_warehouse: String,
    /// Warehouse of the request line, or "N/A"
    pub target_warehouse: String,
    pub required_qty: Decimal,
    pub actual_qty: Decimal,
    pub projected_qty: Decimal,
    /// Clamped at zero once stock has caught up
    pub shortfall: Decimal,
}

/// A draft shortfall request with its lines re-evaluated against stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftReportEntry {
    pub material_request: String,
    pub work_order: Option<String>,
    pub work_order_status: String,
    pub lines: Vec<DraftReportLine>,
}

/// Draft shortfall requests, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftReport {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<DraftReportEntry>,
}

impl DraftReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
