//! Love Test Service Binary
//!
//! Runs the REST API with:
//! - Structured JSON logging
//! - Request correlation ids
//! - Graceful shutdown handling
//!
//! ## Configuration
//!
//! Environment variables:
//! - `ADMIN_USERNAME`, `ADMIN_PASSWORD`: Admin credential (required)
//! - `JWT_SECRET`: Token signing secret (random per process if unset)
//! - `STORE_BACKEND`: `postgres` (default) or `memory`
//! - `DATABASE_URL`: PostgreSQL connection string (postgres backend)
//! - `PORT`: Service port (default: 5000)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: any)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! ADMIN_USERNAME=admin ADMIN_PASSWORD=... JWT_SECRET=... DATABASE_URL=postgresql://... \
//!     cargo run --bin love_test_service
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use love_test_service::service::{
    create_router, with_http_layers, ServiceConfig, ServiceState, StoreBackend,
};
use love_test_service::{InMemoryRecordStore, PostgresRecordStore, RecordStore, TokenConfig};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "love_test_service=info,tower_http=info,sqlx=warn".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
            )
            .init();
    }
}

fn build_app<S: RecordStore + 'static>(state: ServiceState<S>, config: &ServiceConfig) -> Router {
    with_http_layers(create_router(state), &config.cors_origins)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

async fn serve(app: Router, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Love Test Service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn connect_postgres() -> Result<PostgresRecordStore, Box<dyn std::error::Error>> {
    info!("Connecting to PostgreSQL...");
    let connect_start = Instant::now();

    let store = match tokio::time::timeout(
        std::time::Duration::from_secs(30),
        PostgresRecordStore::from_env(),
    )
    .await
    {
        Ok(Ok(store)) => store,
        Ok(Err(e)) => {
            error!(error = %e, "Failed to connect to PostgreSQL");
            return Err(e.into());
        }
        Err(_) => {
            error!("PostgreSQL connection timeout after 30s");
            return Err("Database connection timeout".into());
        }
    };

    store.ensure_schema().await?;

    let stats = store.pool_stats();
    info!(
        latency_ms = connect_start.elapsed().as_millis() as u64,
        pool_size = stats.size,
        pool_idle = stats.idle,
        pool_max = stats.max,
        "PostgreSQL connection established"
    );
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let version = env!("CARGO_PKG_VERSION");
    info!(version = version, "Starting Love Test Service");

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(config = ?config, "Configuration loaded");

    let credential = config.admin_credential();
    let token_config = TokenConfig::from_env();
    let addr: SocketAddr = config.socket_addr().parse()?;

    match config.store_backend {
        StoreBackend::Postgres => {
            let store = connect_postgres().await?;
            let state = ServiceState::with_admin(store, credential, token_config);
            serve(build_app(state, &config), addr).await?;
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store. Records are lost on restart!");
            let state = ServiceState::with_admin(InMemoryRecordStore::new(), credential, token_config);
            serve(build_app(state, &config), addr).await?;
        }
    }

    info!("Love Test Service shutdown complete");
    Ok(())
}
