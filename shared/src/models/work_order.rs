//! Manufacturing work order models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::DocStatus;

/// A submitted or draft manufacturing work order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkOrder {
    pub name: String,
    pub status: WorkOrderStatus,
    pub docstatus: DocStatus,
    /// Default source warehouse for required items
    pub source_warehouse: Option<String>,
    /// Work-in-progress warehouse, last resort for item sourcing
    pub wip_warehouse: Option<String>,
    pub required_items: Vec<RequiredItem>,
}

/// A line of the work order's bill of required materials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequiredItem {
    pub item_code: String,
    pub required_qty: Decimal,
    /// Item-level override of the work order's source warehouse
    pub source_warehouse: Option<String>,
    /// Target warehouse
    pub warehouse: Option<String>,
}

/// Work order listing row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkOrderSummary {
    pub name: String,
    pub status: WorkOrderStatus,
}

/// Work order status as reported by the ERP
///
/// Statuses the service does not know about are preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum WorkOrderStatus {
    Draft,
    NotStarted,
    InProcess,
    Stopped,
    Completed,
    Closed,
    Cancelled,
    Other(String),
}

impl WorkOrderStatus {
    pub fn label(&self) -> &str {
        match self {
            WorkOrderStatus::Draft => "Draft",
            WorkOrderStatus::NotStarted => "Not Started",
            WorkOrderStatus::InProcess => "In Process",
            WorkOrderStatus::Stopped => "Stopped",
            WorkOrderStatus::Completed => "Completed",
            WorkOrderStatus::Closed => "Closed",
            WorkOrderStatus::Cancelled => "Cancelled",
            WorkOrderStatus::Other(label) => label,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, WorkOrderStatus::Completed)
    }
}

impl From<String> for WorkOrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Draft" => WorkOrderStatus::Draft,
            "Not Started" => WorkOrderStatus::NotStarted,
            "In Process" => WorkOrderStatus::InProcess,
            "Stopped" => WorkOrderStatus::Stopped,
            "Completed" => WorkOrderStatus::Completed,
            "Closed" => WorkOrderStatus::Closed,
            "Cancelled" => WorkOrderStatus::Cancelled,
            _ => WorkOrderStatus::Other(value),
        }
    }
}

impl From<&str> for WorkOrderStatus {
    fn from(value: &str) -> Self {
        WorkOrderStatus::from(value.to_string())
    }
}

impl From<WorkOrderStatus> for String {
    fn from(status: WorkOrderStatus) -> Self {
        status.label().to_string()
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl WorkOrder {
    /// Find the first required item with the given item code
    pub fn required_item(&self, item_code: &str) -> Option<&RequiredItem> {
        self.required_items.iter().find(|i| i.item_code == item_code)
    }
}
