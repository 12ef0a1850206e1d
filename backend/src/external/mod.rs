//! External ERP integration
//!
//! Services depend on the [`ErpClient`] trait only. [`FrappeClient`] talks to
//! the ERP REST API; tests substitute an in-memory implementation.

use async_trait::async_trait;
use shared::{
    BinSnapshot, CreateRequestOutcome, DocStatus, MaterialRequest, MaterialRequestSummary,
    WorkOrder, WorkOrderSummary,
};

use crate::error::AppResult;

pub mod frappe;

pub use frappe::FrappeClient;

/// Filter for listing work orders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderFilter {
    pub docstatus: DocStatus,
    /// Status the listing must not have
    pub exclude_status: Option<String>,
}

impl WorkOrderFilter {
    /// Submitted work orders that are not completed yet
    pub fn open_submitted() -> Self {
        Self {
            docstatus: DocStatus::Submitted,
            exclude_status: Some("Completed".to_string()),
        }
    }
}

/// Docstatus condition of a material request listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStatusFilter {
    Is(DocStatus),
    Not(DocStatus),
}

impl DocStatusFilter {
    pub fn matches(&self, status: DocStatus) -> bool {
        match self {
            DocStatusFilter::Is(s) => status == *s,
            DocStatusFilter::Not(s) => status != *s,
        }
    }
}

/// Filter for listing shortfall material requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRequestFilter {
    pub work_order: Option<String>,
    pub docstatus: DocStatusFilter,
    /// Newest first when set
    pub newest_first: bool,
    pub limit: Option<u32>,
}

impl MaterialRequestFilter {
    /// Draft shortfall requests, newest first
    pub fn drafts() -> Self {
        Self {
            work_order: None,
            docstatus: DocStatusFilter::Is(DocStatus::Draft),
            newest_first: true,
            limit: None,
        }
    }
}

/// Read and write operations the service needs from the ERP
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn list_work_orders(&self, filter: &WorkOrderFilter) -> AppResult<Vec<WorkOrderSummary>>;

    /// Lists material requests carrying the shortfall flag
    async fn list_material_requests(
        &self,
        filter: &MaterialRequestFilter,
    ) -> AppResult<Vec<MaterialRequestSummary>>;

    async fn get_work_order(&self, name: &str) -> AppResult<WorkOrder>;

    async fn get_material_request(&self, name: &str) -> AppResult<MaterialRequest>;

    /// `None` when the item has never been stocked in the warehouse
    async fn get_bin(&self, item_code: &str, warehouse: &str) -> AppResult<Option<BinSnapshot>>;

    async fn create_shortfall_material_request(
        &self,
        work_order: &str,
    ) -> AppResult<CreateRequestOutcome>;
}
