//! Material (purchase) request models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::DocStatus;

/// A material request raised to cover a work order shortfall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialRequest {
    pub name: String,
    /// Back-reference to the originating work order
    pub work_order: Option<String>,
    pub docstatus: DocStatus,
    /// Set when the request was raised from the shortfall report
    pub shortfall_item_mr: bool,
    pub items: Vec<MaterialRequestItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialRequestItem {
    pub item_code: String,
    pub qty: Decimal,
    pub warehouse: Option<String>,
}

/// Material request listing row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialRequestSummary {
    pub name: String,
    pub work_order: Option<String>,
    pub docstatus: DocStatus,
}

/// Result of asking the ERP to raise a shortfall material request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRequestOutcome {
    pub mr_name: String,
    /// True when an open request already existed and nothing was created
    pub already_exists: bool,
}
