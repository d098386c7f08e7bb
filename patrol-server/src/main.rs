use anyhow::Context;
use patrol_controller::{ControllerConfig, KubectlClient, RunController};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod catalog;
pub mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "patrol_server=info,patrol_controller=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ping Patrol server...");

    let server_config = ServerConfig::from_env();
    let controller_config =
        ControllerConfig::from_env().context("Invalid controller configuration")?;

    tracing::info!(
        "Jobs run in namespace {} with image {} (polling every {:?}, up to {:?})",
        controller_config.namespace,
        controller_config.image,
        controller_config.poll_interval,
        controller_config.polling_budget()
    );

    let template_path = controller_config.template_path.clone();
    let cluster = Arc::new(KubectlClient::new(controller_config.kubectl.clone()));
    tracing::info!("Reaching the control plane through {}", cluster.binary());
    let controller = RunController::from_config(controller_config, cluster)
        .with_context(|| format!("Failed to load job template {}", template_path.display()))?;

    let state = api::AppState::new(
        Arc::new(controller),
        server_config.destinations_file.clone(),
    );
    let cors = api::cors_layer(server_config.cors_origin.as_deref())?;

    // Build router with all API endpoints
    let app = api::create_router(state, cors);

    tracing::info!("Listening on {}", server_config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
