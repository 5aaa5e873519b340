// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::sensor_feed::SensorCapability;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::{load_app_config, AppConfig};
use crate::infrastructure::http_geolocation::{GeolocationOptions, HttpGeolocation};
use crate::infrastructure::sysfs_battery::SysfsBattery;
use crate::infrastructure::sysfs_network::SysfsNetwork;
use crate::infrastructure::viewport::ViewportObserver;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create sensor capabilities (infrastructure layer)
    let viewport = Arc::new(ViewportObserver::new(config.visibility.threshold));
    let capabilities = build_capabilities(&config, viewport.clone())?;

    // Start the dashboard (application layer)
    let runtime = DashboardService::new(capabilities).start().await;
    tracing::info!(feeds = ?runtime.active_feeds(), "dashboard started");
    let handle = runtime.handle();
    let streaming_service = StreamingDashboardService::new(handle.clone(), config.stream.buffer);

    // Create application state
    let state = Arc::new(AppState {
        dashboard: handle,
        streaming_service,
        viewport,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting device-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.shutdown().await;
    Ok(())
}

fn build_capabilities(
    config: &AppConfig,
    viewport: Arc<ViewportObserver>,
) -> anyhow::Result<Vec<Arc<dyn SensorCapability>>> {
    let mut capabilities: Vec<Arc<dyn SensorCapability>> = Vec::new();

    if config.battery.enabled {
        capabilities.push(Arc::new(SysfsBattery::new(
            &config.battery.sysfs_root,
            config.battery.poll_interval(),
        )));
    }

    if config.network.enabled {
        capabilities.push(Arc::new(SysfsNetwork::new(
            &config.network.sysfs_root,
            config.network.interface.clone(),
            config.network.probe_addr.clone(),
            config.network.probe_timeout(),
            config.network.poll_interval(),
        )));
    }

    let geolocation = &config.geolocation;
    let options = GeolocationOptions {
        high_accuracy: geolocation.high_accuracy,
        timeout: Duration::from_millis(geolocation.timeout_ms),
        max_cached_age: Duration::from_millis(geolocation.max_cached_age_ms),
    };
    capabilities.push(Arc::new(HttpGeolocation::new(
        geolocation.endpoint.clone(),
        options,
        geolocation.poll_interval(),
    )?));

    capabilities.push(viewport);
    Ok(capabilities)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
