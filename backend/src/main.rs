//! Shortfall Items - Server
//!
//! Serves the shortfall and draft request reports over HTTP.

use std::{net::SocketAddr, sync::Arc};

use shortfall_items_backend::{config::Config, create_app, external::FrappeClient, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shortfall_server=debug,shortfall_items_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Shortfall Items Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("ERP: {}", config.erp.base_url);
    tracing::info!("Exclusion policy: {:?}", config.scanner.exclusion_policy);

    let erp = FrappeClient::new(&config.erp)?;

    // Create application state
    let state = AppState::new(Arc::new(erp), config.clone());

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
