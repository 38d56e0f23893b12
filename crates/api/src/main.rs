use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vtconsole_api::backend::http::VtctldClient;
use vtconsole_api::config::ServerConfig;
use vtconsole_api::dialogs::start_idle_sweep;
use vtconsole_api::router::build_app_router;
use vtconsole_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vtconsole_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Backend ---
    let client = Arc::new(
        VtctldClient::new(
            config.vtctld_url.clone(),
            Duration::from_secs(config.vtctld_timeout_secs),
        )
        .expect("Failed to build vtctld HTTP client"),
    );
    tracing::info!(vtctld_url = %config.vtctld_url, "vtctld client ready");

    // --- App state ---
    let state = AppState::new(config.clone(), client.clone(), client);
    let dialogs = Arc::clone(&state.dialogs);

    // --- Background tasks ---
    let sweep_handle = start_idle_sweep(
        Arc::clone(&dialogs),
        Duration::from_secs(config.dialog_idle_secs),
    );

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    sweep_handle.abort();

    // Give in-flight dispatches a chance to resolve before dropping them.
    let drain = async {
        while !dialogs.can_deactivate().await {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(shutdown_timeout, drain).await.is_err() {
        tracing::warn!("Pending dispatches did not finish in time, discarding them");
    }

    let open = dialogs.session_count().await;
    tracing::info!(open, "Tearing down open dialogs");
    dialogs.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
