//! Route definitions for the Shortfall Items service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Shortfall scan over open work orders
        .route("/shortfall", get(handlers::load_work_orders))
        // Draft shortfall requests
        .route("/drafts", get(handlers::load_purchase_requests))
        // Material request creation
        .nest("/work-orders", work_order_routes())
}

/// Work order action routes
fn work_order_routes() -> Router<AppState> {
    Router::new().route(
        "/:work_order/material-request",
        post(handlers::create_material_request),
    )
}
