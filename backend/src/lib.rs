//! Shortfall Items service
//!
//! Scans open manufacturing work orders for items that cannot be covered from
//! stock, reports them per work order, and raises material requests through
//! the ERP.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use external::ErpClient;
use services::{DocumentLinks, ReportRenderer, ScanSupervisor, ShortfallCommands};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub erp: Arc<dyn ErpClient>,
    pub config: Arc<Config>,
    /// Tracks scans per desk client so a client's new scan replaces its older one
    pub supervisor: ScanSupervisor,
}

impl AppState {
    pub fn new(erp: Arc<dyn ErpClient>, config: Config) -> Self {
        Self {
            erp,
            config: Arc::new(config),
            supervisor: ScanSupervisor::new(),
        }
    }

    pub fn links(&self) -> DocumentLinks {
        DocumentLinks::new(self.config.erp.desk_url())
    }

    pub fn commands(&self) -> ShortfallCommands {
        ShortfallCommands::new(
            Arc::clone(&self.erp),
            self.config.scanner.exclusion_policy,
            self.config.scanner.max_concurrency,
            self.supervisor.clone(),
            self.links(),
        )
    }

    pub fn renderer(&self) -> ReportRenderer {
        ReportRenderer::new(self.links())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Shortfall Items API v1.0"
}
