//! Draft shortfall request report
//!
//! Re-evaluates every draft shortfall material request against current stock,
//! cross-referencing the originating work order for source warehouses and
//! required quantities.

use std::sync::Arc;

use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use shared::{
    build_draft_line, draft_source_warehouse, DraftReport, DraftReportEntry,
    MaterialRequestSummary, NOT_AVAILABLE,
};

use crate::error::AppResult;
use crate::external::{ErpClient, MaterialRequestFilter};

/// Builds the draft request report
#[derive(Clone)]
pub struct DraftReportBuilder {
    erp: Arc<dyn ErpClient>,
    max_concurrency: usize,
}

impl DraftReportBuilder {
    pub fn new(erp: Arc<dyn ErpClient>) -> Self {
        Self {
            erp,
            max_concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Build the report, newest request first
    pub async fn build(&self) -> AppResult<DraftReport> {
        let requests = self
            .erp
            .list_material_requests(&MaterialRequestFilter::drafts())
            .await?;

        tracing::info!(requests = requests.len(), "Loading draft shortfall requests");

        let entries: Vec<DraftReportEntry> = stream::iter(requests.into_iter().map(|mr| {
            let builder = self.clone();
            async move { builder.build_entry(&mr).await }
        }))
        .buffered(self.max_concurrency)
        .try_collect()
        .await?;

        Ok(DraftReport {
            generated_at: Utc::now(),
            entries,
        })
    }

    async fn build_entry(&self, summary: &MaterialRequestSummary) -> AppResult<DraftReportEntry> {
        let request = self.erp.get_material_request(&summary.name).await?;

        let work_order_name = request
            .work_order
            .clone()
            .or_else(|| summary.work_order.clone());
        let work_order = match &work_order_name {
            Some(name) => Some(self.erp.get_work_order(name).await?),
            None => {
                tracing::warn!(material_request = %request.name, "Draft request has no work order");
                None
            }
        };

        let mut lines = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let matched = work_order
                .as_ref()
                .and_then(|wo| wo.required_item(&line.item_code));

            let bin = match draft_source_warehouse(matched) {
                Some(warehouse) => self.erp.get_bin(&line.item_code, warehouse).await?,
                None => None,
            };

            lines.push(build_draft_line(line, matched, bin));
        }

        Ok(DraftReportEntry {
            material_request: request.name,
            work_order: work_order_name,
            work_order_status: work_order
                .map(|wo| wo.status.label().to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            lines,
        })
    }
}
