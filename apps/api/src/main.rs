//! # Tab Split API Server
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Tracing ── RUST_LOG, default "info,tabsplit=debug"                  │
//! │  2. Config  ── .env + environment                                       │
//! │  3. State   ── empty Store (bounded receipts) + VisionClient            │
//! │  4. Serve   ── axum on TABSPLIT_HOST:TABSPLIT_PORT until Ctrl+C/SIGTERM │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tabsplit_api::config::ApiConfig;
use tabsplit_api::{router, AppState};
use tabsplit_scan::VisionClient;
use tabsplit_store::Store;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Tab Split API server...");

    let config = ApiConfig::load()?;
    let addr = config.bind_address()?;
    info!(
        %addr,
        frontend_url = %config.frontend_url,
        max_upload_bytes = config.max_upload_bytes,
        max_stored_receipts = config.max_stored_receipts,
        "Configuration loaded"
    );
    if config.vision.api_key.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; receipt scanning will fail");
    }

    let scanner = VisionClient::new(config.vision.clone())?;
    let store = Store::with_receipt_capacity(config.max_stored_receipts);
    let state = AppState::new(store, Arc::new(scanner), config);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tabsplit=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
