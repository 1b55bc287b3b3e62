//! billing-server: medical-billing question answering HTTP server.

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billing_server::AppState;
use billing_server::ai::ClaudeClient;
use billing_server::config::{Config, DatabaseConfig};
use billing_server::db::PgDatabase;
use billing_server::pipeline::{PipelineOptions, SqlPipeline};
use billing_server::session::SessionStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let db_config =
        DatabaseConfig::load(&config.sql_config_path).expect("Failed to load database config");

    // Create database pool
    let pool = billing_server::db::create_pool(&db_config).expect("Failed to create database pool");
    let database = PgDatabase::new(pool, db_config.schema.clone());

    let api_key = config
        .anthropic_api_key
        .clone()
        .expect("ANTHROPIC_API_KEY must be set");
    let llm = ClaudeClient::new(api_key)
        .with_model(config.llm_model.clone())
        .with_api_url(config.llm_api_url.clone())
        .with_timeout(Duration::from_secs(config.llm_timeout_secs))
        .expect("Failed to build LLM client");

    // Log startup info
    tracing::info!(
        host = %db_config.host,
        database = %db_config.database,
        tables = config.tables.len(),
        "Database configured"
    );
    tracing::info!(model = %config.llm_model, "LLM configured");
    tracing::info!(
        path = %config.log_path.display(),
        memory_window = config.memory_window,
        "Question log and conversation windows configured"
    );

    let pipeline = SqlPipeline::new(
        llm,
        database,
        PipelineOptions {
            tables: config.tables.clone(),
            top_k: config.top_k,
            log_path: config.log_path.clone(),
        },
    );
    let state = AppState::new(pipeline, SessionStore::new(config.memory_window));

    // Build application
    let app = billing_server::build_app(state, &config);

    // Start server
    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting billing server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
