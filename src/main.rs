use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensor_chart::backend::BackendClient;
use sensor_chart::common::AppState;
use sensor_chart::config::Config;
use sensor_chart::refresh;
use sensor_chart::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sensor_chart=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sensor-chart...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        host = %config.api_host,
        port = config.api_port,
        backend = %config.backend_base_url,
        devices = config.devices.len(),
        timeframes = config.timeframes.len(),
        session_idle_seconds = config.session_idle_seconds,
        "Configuration loaded"
    );

    let backend = BackendClient::new(&config)?;
    tracing::info!("Backend client initialized");

    // Selectors populated here; each page gets its own chart session
    let state = AppState::new(config.clone(), Arc::new(backend));

    tokio::spawn(refresh::run_chart_refresh(state.clone()));

    let app = routes::build_router(state)?;

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
