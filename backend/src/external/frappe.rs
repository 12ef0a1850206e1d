//! ERP REST API client
//!
//! Talks to the Frappe resource and method endpoints. Raw payloads are
//! deserialized into loosely shaped `Raw*` structs and validated into the
//! shared domain models before they leave this module.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use shared::{
    normalize_link, validate_document_name, validate_work_order, BinSnapshot,
    CreateRequestOutcome, DocStatus, MaterialRequest, MaterialRequestItem,
    MaterialRequestSummary, RequiredItem, WorkOrder, WorkOrderStatus, WorkOrderSummary,
};

use super::{DocStatusFilter, ErpClient, MaterialRequestFilter, WorkOrderFilter};
use crate::config::ErpConfig;
use crate::error::{AppError, AppResult};

const WORK_ORDER: &str = "Work Order";
const MATERIAL_REQUEST: &str = "Material Request";
const BIN: &str = "Bin";
const SHORTFALL_FLAG: &str = "custom_shortfall_item_mr";

/// ERP REST API client
#[derive(Clone)]
pub struct FrappeClient {
    client: Client,
    base_url: Url,
    authorization: String,
    create_method: String,
}

/// `{"data": ...}` envelope of resource endpoints
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// `{"message": ...}` envelope of method endpoints
#[derive(Debug, Deserialize)]
struct MessageEnvelope<T> {
    message: Option<T>,
}

#[derive(Debug, Deserialize)]
struct RawWorkOrderSummary {
    name: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWorkOrder {
    name: String,
    status: Option<String>,
    docstatus: DocStatus,
    source_warehouse: Option<String>,
    wip_warehouse: Option<String>,
    #[serde(default)]
    required_items: Vec<RawRequiredItem>,
}

#[derive(Debug, Deserialize)]
struct RawRequiredItem {
    item_code: Option<String>,
    required_qty: Option<Decimal>,
    source_warehouse: Option<String>,
    warehouse: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMaterialRequestSummary {
    name: String,
    work_order: Option<String>,
    docstatus: DocStatus,
}

#[derive(Debug, Deserialize)]
struct RawMaterialRequest {
    name: String,
    work_order: Option<String>,
    docstatus: DocStatus,
    #[serde(rename = "custom_shortfall_item_mr")]
    shortfall_flag: Option<Flag>,
    #[serde(default)]
    items: Vec<RawMaterialRequestItem>,
}

#[derive(Debug, Deserialize)]
struct RawMaterialRequestItem {
    item_code: Option<String>,
    qty: Option<Decimal>,
    warehouse: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBin {
    actual_qty: Option<Decimal>,
    projected_qty: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct RawCreateOutcome {
    mr_name: String,
    #[serde(default)]
    already_exists: Option<Flag>,
}

/// Check fields arrive as 0/1 or as booleans depending on the endpoint
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

impl RawWorkOrder {
    fn into_work_order(self) -> AppResult<WorkOrder> {
        let name = self.name.clone();
        let mut required_items = Vec::with_capacity(self.required_items.len());
        for (idx, item) in self.required_items.into_iter().enumerate() {
            let item_code = item.item_code.ok_or_else(|| {
                AppError::invalid_document(
                    WORK_ORDER,
                    &name,
                    format!("required item {} has no item code", idx + 1),
                )
            })?;
            required_items.push(RequiredItem {
                item_code,
                required_qty: item.required_qty.unwrap_or(Decimal::ZERO),
                source_warehouse: normalize_link(item.source_warehouse.as_deref()),
                warehouse: normalize_link(item.warehouse.as_deref()),
            });
        }

        let work_order = WorkOrder {
            name: self.name,
            status: WorkOrderStatus::from(self.status.unwrap_or_default()),
            docstatus: self.docstatus,
            source_warehouse: normalize_link(self.source_warehouse.as_deref()),
            wip_warehouse: normalize_link(self.wip_warehouse.as_deref()),
            required_items,
        };

        validate_work_order(&work_order)
            .map_err(|reason| AppError::invalid_document(WORK_ORDER, &name, reason))?;

        Ok(work_order)
    }
}

impl RawMaterialRequest {
    fn into_material_request(self) -> AppResult<MaterialRequest> {
        let name = self.name.clone();
        let mut items = Vec::with_capacity(self.items.len());
        for (idx, item) in self.items.into_iter().enumerate() {
            let item_code = item.item_code.ok_or_else(|| {
                AppError::invalid_document(
                    MATERIAL_REQUEST,
                    &name,
                    format!("line {} has no item code", idx + 1),
                )
            })?;
            let qty = item.qty.unwrap_or(Decimal::ZERO);
            shared::validate_quantity(qty)
                .map_err(|reason| AppError::invalid_document(MATERIAL_REQUEST, &name, reason))?;
            items.push(MaterialRequestItem {
                item_code,
                qty,
                warehouse: normalize_link(item.warehouse.as_deref()),
            });
        }

        Ok(MaterialRequest {
            name: self.name,
            work_order: normalize_link(self.work_order.as_deref()),
            docstatus: self.docstatus,
            shortfall_item_mr: self.shortfall_flag.map(Flag::is_set).unwrap_or(false),
            items,
        })
    }
}

impl FrappeClient {
    /// Create a new FrappeClient from configuration
    pub fn new(config: &ErpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(client, config)
    }

    /// Create a new FrappeClient reusing an existing HTTP client
    pub fn with_client(client: Client, config: &ErpConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Configuration(format!("Invalid ERP base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            authorization: format!("token {}:{}", config.api_key, config.api_secret),
            create_method: config.create_method.clone(),
        })
    }

    /// Build `/api/<segments...>` below the base URL, percent-encoding each segment
    fn api_url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::Configuration("ERP base URL cannot be a base".into()))?;
            path.pop_if_empty().push("api").extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> AppResult<Option<T>> {
        tracing::debug!(url = %url, "ERP GET");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::ErpUnavailable(format!("ERP request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ErpResponse {
                status: status.as_u16(),
                body,
            });
        }

        let data = response
            .json::<T>()
            .await
            .map_err(|e| AppError::ErpUnavailable(format!("Failed to parse ERP response: {}", e)))?;

        Ok(Some(data))
    }

    async fn list_resource<T: DeserializeOwned>(
        &self,
        doctype: &str,
        filters: serde_json::Value,
        fields: &[&str],
        order_by: Option<&str>,
        limit: Option<u32>,
    ) -> AppResult<Vec<T>> {
        let url = self.api_url(&["resource", doctype])?;
        let mut query = vec![
            ("filters", filters.to_string()),
            ("fields", json!(fields).to_string()),
            // 0 means unlimited
            ("limit_page_length", limit.unwrap_or(0).to_string()),
        ];
        if let Some(order_by) = order_by {
            query.push(("order_by", order_by.to_string()));
        }

        let envelope: Option<DataEnvelope<Vec<T>>> = self.get_json(url, &query).await?;
        envelope
            .map(|e| e.data)
            .ok_or_else(|| AppError::NotFound(format!("DocType {}", doctype)))
    }

    async fn get_resource<T: DeserializeOwned>(&self, doctype: &str, name: &str) -> AppResult<T> {
        validate_document_name(name).map_err(|e| AppError::validation("name", e))?;
        let url = self.api_url(&["resource", doctype, name])?;

        let envelope: Option<DataEnvelope<T>> = self.get_json(url, &[]).await?;
        envelope
            .map(|e| e.data)
            .ok_or_else(|| AppError::NotFound(format!("{} {}", doctype, name)))
    }
}

#[async_trait]
impl ErpClient for FrappeClient {
    async fn list_work_orders(&self, filter: &WorkOrderFilter) -> AppResult<Vec<WorkOrderSummary>> {
        let mut filters = vec![json!(["docstatus", "=", filter.docstatus.code()])];
        if let Some(status) = &filter.exclude_status {
            filters.push(json!(["status", "!=", status]));
        }

        let rows: Vec<RawWorkOrderSummary> = self
            .list_resource(WORK_ORDER, json!(filters), &["name", "status"], None, None)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| WorkOrderSummary {
                name: r.name,
                status: WorkOrderStatus::from(r.status.unwrap_or_default()),
            })
            .collect())
    }

    async fn list_material_requests(
        &self,
        filter: &MaterialRequestFilter,
    ) -> AppResult<Vec<MaterialRequestSummary>> {
        let mut filters = vec![json!([SHORTFALL_FLAG, "=", 1])];
        if let Some(work_order) = &filter.work_order {
            filters.push(json!(["work_order", "=", work_order]));
        }
        filters.push(match filter.docstatus {
            DocStatusFilter::Is(s) => json!(["docstatus", "=", s.code()]),
            DocStatusFilter::Not(s) => json!(["docstatus", "!=", s.code()]),
        });

        let order_by = filter.newest_first.then_some("creation desc");
        let rows: Vec<RawMaterialRequestSummary> = self
            .list_resource(
                MATERIAL_REQUEST,
                json!(filters),
                &["name", "work_order", "docstatus"],
                order_by,
                filter.limit,
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| MaterialRequestSummary {
                name: r.name,
                work_order: normalize_link(r.work_order.as_deref()),
                docstatus: r.docstatus,
            })
            .collect())
    }

    async fn get_work_order(&self, name: &str) -> AppResult<WorkOrder> {
        let raw: RawWorkOrder = self.get_resource(WORK_ORDER, name).await?;
        raw.into_work_order()
    }

    async fn get_material_request(&self, name: &str) -> AppResult<MaterialRequest> {
        let raw: RawMaterialRequest = self.get_resource(MATERIAL_REQUEST, name).await?;
        raw.into_material_request()
    }

    async fn get_bin(&self, item_code: &str, warehouse: &str) -> AppResult<Option<BinSnapshot>> {
        let filters = json!([
            ["item_code", "=", item_code],
            ["warehouse", "=", warehouse]
        ]);
        let rows: Vec<RawBin> = self
            .list_resource(BIN, filters, &["actual_qty", "projected_qty"], None, Some(1))
            .await?;

        Ok(rows.into_iter().next().map(|bin| {
            BinSnapshot::new(
                bin.actual_qty.unwrap_or(Decimal::ZERO),
                bin.projected_qty.unwrap_or(Decimal::ZERO),
            )
        }))
    }

    async fn create_shortfall_material_request(
        &self,
        work_order: &str,
    ) -> AppResult<CreateRequestOutcome> {
        let url = self.api_url(&["method", self.create_method.as_str()])?;
        tracing::info!(work_order, "Requesting shortfall material request");

        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(&json!({ "work_order": work_order }))
            .send()
            .await
            .map_err(|e| AppError::ErpUnavailable(format!("ERP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ErpResponse {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: MessageEnvelope<RawCreateOutcome> = response
            .json()
            .await
            .map_err(|e| AppError::ErpUnavailable(format!("Failed to parse ERP response: {}", e)))?;

        let outcome = envelope.message.ok_or_else(|| {
            AppError::invalid_document(MATERIAL_REQUEST, work_order, "empty response from ERP")
        })?;

        Ok(CreateRequestOutcome {
            mr_name: outcome.mr_name,
            already_exists: outcome.already_exists.map(Flag::is_set).unwrap_or(false),
        })
    }
}
