//! In-memory ERP used by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    BinSnapshot, CreateRequestOutcome, DocStatus, MaterialRequest, MaterialRequestItem,
    MaterialRequestSummary, RequiredItem, WorkOrder, WorkOrderStatus, WorkOrderSummary,
};
use shortfall_items_backend::error::{AppError, AppResult};
use shortfall_items_backend::external::{ErpClient, MaterialRequestFilter, WorkOrderFilter};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn required(item_code: &str, qty: &str, source_warehouse: Option<&str>) -> RequiredItem {
    RequiredItem {
        item_code: item_code.to_string(),
        required_qty: dec(qty),
        source_warehouse: source_warehouse.map(str::to_string),
        warehouse: None,
    }
}

pub fn work_order(name: &str, status: WorkOrderStatus, items: Vec<RequiredItem>) -> WorkOrder {
    WorkOrder {
        name: name.to_string(),
        status,
        docstatus: DocStatus::Submitted,
        source_warehouse: None,
        wip_warehouse: None,
        required_items: items,
    }
}

pub fn request_line(item_code: &str, qty: &str, warehouse: Option<&str>) -> MaterialRequestItem {
    MaterialRequestItem {
        item_code: item_code.to_string(),
        qty: dec(qty),
        warehouse: warehouse.map(str::to_string),
    }
}

pub fn shortfall_request(
    name: &str,
    work_order: Option<&str>,
    docstatus: DocStatus,
    items: Vec<MaterialRequestItem>,
) -> MaterialRequest {
    MaterialRequest {
        name: name.to_string(),
        work_order: work_order.map(str::to_string),
        docstatus,
        shortfall_item_mr: true,
        items,
    }
}

#[derive(Default)]
struct FakeState {
    work_orders: Vec<WorkOrder>,
    /// Oldest first
    requests: Vec<MaterialRequest>,
    bins: HashMap<(String, String), BinSnapshot>,
    failing: Vec<String>,
    calls: Vec<String>,
    created: u32,
}

/// ERP double holding documents in memory
#[derive(Clone, Default)]
pub struct FakeErp {
    state: Arc<Mutex<FakeState>>,
}

impl FakeErp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work_order(self, work_order: WorkOrder) -> Self {
        self.state.lock().unwrap().work_orders.push(work_order);
        self
    }

    pub fn with_request(self, request: MaterialRequest) -> Self {
        self.state.lock().unwrap().requests.push(request);
        self
    }

    pub fn with_bin(self, item_code: &str, warehouse: &str, actual: &str, projected: &str) -> Self {
        self.state.lock().unwrap().bins.insert(
            (item_code.to_string(), warehouse.to_string()),
            BinSnapshot::new(dec(actual), dec(projected)),
        );
        self
    }

    /// Make every fetch of the named document fail
    pub fn failing_on(self, name: &str) -> Self {
        self.state.lock().unwrap().failing.push(name.to_string());
        self
    }

    pub fn set_bin(&self, item_code: &str, warehouse: &str, actual: &str, projected: &str) {
        self.state.lock().unwrap().bins.insert(
            (item_code.to_string(), warehouse.to_string()),
            BinSnapshot::new(dec(actual), dec(projected)),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn requests(&self) -> Vec<MaterialRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn into_client(self) -> Arc<dyn ErpClient> {
        Arc::new(self)
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check_failure(&self, name: &str) -> AppResult<()> {
        if self.state.lock().unwrap().failing.iter().any(|f| f == name) {
            return Err(AppError::ErpUnavailable(format!("fetch of {} failed", name)));
        }
        Ok(())
    }
}

#[async_trait]
impl ErpClient for FakeErp {
    async fn list_work_orders(&self, filter: &WorkOrderFilter) -> AppResult<Vec<WorkOrderSummary>> {
        self.record("list_work_orders".to_string());
        let state = self.state.lock().unwrap();
        Ok(state
            .work_orders
            .iter()
            .filter(|wo| wo.docstatus == filter.docstatus)
            .filter(|wo| filter.exclude_status.as_deref() != Some(wo.status.label()))
            .map(|wo| WorkOrderSummary {
                name: wo.name.clone(),
                status: wo.status.clone(),
            })
            .collect())
    }

    async fn list_material_requests(
        &self,
        filter: &MaterialRequestFilter,
    ) -> AppResult<Vec<MaterialRequestSummary>> {
        self.record(format!("list_material_requests:{:?}", filter.work_order));
        let state = self.state.lock().unwrap();
        let mut found: Vec<MaterialRequestSummary> = state
            .requests
            .iter()
            .filter(|mr| mr.shortfall_item_mr)
            .filter(|mr| filter.docstatus.matches(mr.docstatus))
            .filter(|mr| match &filter.work_order {
                Some(wo) => mr.work_order.as_deref() == Some(wo.as_str()),
                None => true,
            })
            .map(|mr| MaterialRequestSummary {
                name: mr.name.clone(),
                work_order: mr.work_order.clone(),
                docstatus: mr.docstatus,
            })
            .collect();
        if filter.newest_first {
            found.reverse();
        }
        if let Some(limit) = filter.limit {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn get_work_order(&self, name: &str) -> AppResult<WorkOrder> {
        self.record(format!("get_work_order:{}", name));
        self.check_failure(name)?;
        let state = self.state.lock().unwrap();
        state
            .work_orders
            .iter()
            .find(|wo| wo.name == name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Work Order {}", name)))
    }

    async fn get_material_request(&self, name: &str) -> AppResult<MaterialRequest> {
        self.record(format!("get_material_request:{}", name));
        self.check_failure(name)?;
        let state = self.state.lock().unwrap();
        state
            .requests
            .iter()
            .find(|mr| mr.name == name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Material Request {}", name)))
    }

    async fn get_bin(&self, item_code: &str, warehouse: &str) -> AppResult<Option<BinSnapshot>> {
        self.record(format!("get_bin:{}:{}", item_code, warehouse));
        let state = self.state.lock().unwrap();
        Ok(state
            .bins
            .get(&(item_code.to_string(), warehouse.to_string()))
            .copied())
    }

    async fn create_shortfall_material_request(
        &self,
        work_order: &str,
    ) -> AppResult<CreateRequestOutcome> {
        self.record(format!("create:{}", work_order));
        self.check_failure(work_order)?;
        let mut state = self.state.lock().unwrap();

        if let Some(existing) = state.requests.iter().find(|mr| {
            mr.shortfall_item_mr
                && mr.docstatus == DocStatus::Draft
                && mr.work_order.as_deref() == Some(work_order)
        }) {
            return Ok(CreateRequestOutcome {
                mr_name: existing.name.clone(),
                already_exists: true,
            });
        }

        let wo = state
            .work_orders
            .iter()
            .find(|wo| wo.name == work_order)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Work Order {}", work_order)))?;

        state.created += 1;
        let mr_name = format!("MAT-MR-NEW-{:04}", state.created);
        let items = wo
            .required_items
            .iter()
            .map(|item| MaterialRequestItem {
                item_code: item.item_code.clone(),
                qty: item.required_qty,
                warehouse: item.source_warehouse.clone(),
            })
            .collect();
        state.requests.push(MaterialRequest {
            name: mr_name.clone(),
            work_order: Some(work_order.to_string()),
            docstatus: DocStatus::Draft,
            shortfall_item_mr: true,
            items,
        });

        Ok(CreateRequestOutcome {
            mr_name,
            already_exists: false,
        })
    }
}

/// WO-001 needing 100 of ITEM-A from WH-1 with 30 on hand
pub fn standard_erp() -> FakeErp {
    FakeErp::new()
        .with_work_order(work_order(
            "WO-001",
            WorkOrderStatus::InProcess,
            vec![required("ITEM-A", "100", Some("WH-1"))],
        ))
        .with_bin("ITEM-A", "WH-1", "30", "50")
}
