use storage_http_api::{ApiState, build_router, cors_layer};
use storage_runtime::{ChainQueryService, QueryError, ServiceConfig};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] QueryError),

    #[error("Failed to bind HTTP listener on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

fn setup_log() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};
    if tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .is_err()
    {}
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Storage API shutting down...");
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    setup_log();

    let config = ServiceConfig::from_env()?;
    let service = ChainQueryService::connect(&config)?;
    tracing::info!(
        rpc_url = %config.rpc_url,
        contract = %service.contract_address(),
        chain_id = config.chain_id,
        timeout_ms = config.rpc_timeout.as_millis() as u64,
        "Starting storage-api"
    );

    let origins = std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
    let router = build_router(ApiState::new(service)).layer(cors_layer(&origins));

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| StartupError::Bind { port, source })?;
    tracing::info!("Storage API listening on port {port}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}
