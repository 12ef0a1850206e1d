//! Command handlers behind the report surface
//!
//! Each command is a plain async method so it can be driven by the HTTP
//! handlers, tests, or any other front end.

use std::sync::Arc;

use serde::Serialize;
use shared::{DraftReport, ExclusionPolicy, ShortfallReport};

use super::reporting::DocumentLinks;
use super::{DraftReportBuilder, MaterialRequestIssuer, ScanSupervisor, ShortfallScanner};
use crate::error::AppResult;
use crate::external::ErpClient;

/// Response of the create-request command
#[derive(Debug, Clone, Serialize)]
pub struct CreateRequestResponse {
    pub mr_name: String,
    pub already_exists: bool,
    /// Message to show to the user
    pub message: String,
    /// Desk link of the created or existing request
    pub link: String,
    /// Fresh scan, present only when a new request was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed: Option<ShortfallReport>,
}

#[derive(Clone)]
pub struct ShortfallCommands {
    scanner: ShortfallScanner,
    drafts: DraftReportBuilder,
    issuer: MaterialRequestIssuer,
    links: DocumentLinks,
}

impl ShortfallCommands {
    pub fn new(
        erp: Arc<dyn ErpClient>,
        policy: ExclusionPolicy,
        max_concurrency: usize,
        supervisor: ScanSupervisor,
        links: DocumentLinks,
    ) -> Self {
        Self {
            scanner: ShortfallScanner::new(Arc::clone(&erp), policy)
                .with_concurrency(max_concurrency)
                .with_supervisor(supervisor),
            drafts: DraftReportBuilder::new(Arc::clone(&erp)).with_concurrency(max_concurrency),
            issuer: MaterialRequestIssuer::new(erp),
            links,
        }
    }

    pub fn links(&self) -> &DocumentLinks {
        &self.links
    }

    /// Rescan work orders for shortfall
    ///
    /// With a requester, the scan replaces that requester's scan in flight.
    pub async fn on_refresh(&self, requester: Option<&str>) -> AppResult<ShortfallReport> {
        match requester {
            Some(requester) => self.scanner.scan_for(requester).await,
            None => self.scanner.scan().await,
        }
    }

    /// Load draft shortfall requests
    pub async fn on_load_drafts(&self) -> AppResult<DraftReport> {
        self.drafts.build().await
    }

    /// Raise a material request for a work order, then refresh the scan
    ///
    /// An existing request is reported back without rescanning since nothing
    /// changed. Once the ERP has created the request the command succeeds; a
    /// failed refresh only leaves `refreshed` empty.
    pub async fn on_create_request(&self, work_order: &str) -> AppResult<CreateRequestResponse> {
        let outcome = self.issuer.issue(work_order).await?;
        let link = self.links.material_request(&outcome.mr_name);

        if outcome.already_exists {
            return Ok(CreateRequestResponse {
                message: format!("Material Request already exists: {}", outcome.mr_name),
                mr_name: outcome.mr_name,
                already_exists: true,
                link,
                refreshed: None,
            });
        }

        let refreshed = match self.scanner.scan().await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(
                    work_order,
                    material_request = %outcome.mr_name,
                    "Refresh after creating material request failed: {}",
                    e
                );
                None
            }
        };

        Ok(CreateRequestResponse {
            message: format!("Material Request Created: {}", outcome.mr_name),
            mr_name: outcome.mr_name,
            already_exists: false,
            link,
            refreshed,
        })
    }
}
