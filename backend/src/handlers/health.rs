//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub exclusion_policy: String,
}

/// Health check endpoint handler
///
/// Does not call the ERP; a scan is the only meaningful probe of it.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        exclusion_policy: format!("{:?}", state.config.scanner.exclusion_policy),
    })
}
