//! Material request issuing
//!
//! Creation itself happens inside the ERP, which also suppresses duplicates.
//! This service only validates the input and relays the outcome.

use std::sync::Arc;

use shared::{validate_document_name, CreateRequestOutcome};

use crate::error::{AppError, AppResult};
use crate::external::ErpClient;

#[derive(Clone)]
pub struct MaterialRequestIssuer {
    erp: Arc<dyn ErpClient>,
}

impl MaterialRequestIssuer {
    pub fn new(erp: Arc<dyn ErpClient>) -> Self {
        Self { erp }
    }

    /// Raise a shortfall material request for a work order
    pub async fn issue(&self, work_order: &str) -> AppResult<CreateRequestOutcome> {
        let work_order = work_order.trim();
        validate_document_name(work_order).map_err(|e| AppError::validation("work_order", e))?;

        let outcome = self.erp.create_shortfall_material_request(work_order).await?;

        if outcome.already_exists {
            tracing::info!(
                work_order,
                material_request = %outcome.mr_name,
                "Material request already exists"
            );
        } else {
            tracing::info!(
                work_order,
                material_request = %outcome.mr_name,
                "Material request created"
            );
        }

        Ok(outcome)
    }
}
