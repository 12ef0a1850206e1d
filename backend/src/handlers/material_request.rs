//! Material request handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::CreateRequestResponse;
use crate::AppState;

/// Raise a shortfall material request for a work order
pub async fn create_material_request(
    State(state): State<AppState>,
    Path(work_order): Path<String>,
) -> AppResult<Json<CreateRequestResponse>> {
    let response = state.commands().on_create_request(&work_order).await?;
    Ok(Json(response))
}
