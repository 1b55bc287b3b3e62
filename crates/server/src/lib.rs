//! billing-server library crate
//!
//! Exposes `build_app`, the pipeline and its capability traits for
//! integration tests. The actual binary entrypoint is in `main.rs`.

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod journal;
mod middleware;
pub mod pipeline;
mod routes;
pub mod session;

use std::sync::Arc;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ai::CompletionService;
use config::Config;
use db::SqlDatabase;
use pipeline::SqlPipeline;
use session::SessionStore;

/// Shared handler state
pub struct AppState<L, D> {
    pub pipeline: Arc<SqlPipeline<L, D>>,
    pub sessions: Arc<SessionStore>,
}

impl<L, D> AppState<L, D> {
    pub fn new(pipeline: SqlPipeline<L, D>, sessions: SessionStore) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(sessions),
        }
    }
}

impl<L, D> Clone for AppState<L, D> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// with fake LLM and database implementations.
pub fn build_app<L, D>(state: AppState<L, D>, config: &Config) -> Router
where
    L: CompletionService + 'static,
    D: SqlDatabase + 'static,
{
    // Install Prometheus metrics recorder.
    // A second install (e.g. across integration tests) is ignored and we
    // still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let public_routes = Router::new()
        .route("/health", get(routes::health::check::<L, D>))
        .route("/metrics", get(routes::metrics::get::<L, D>))
        .layer(Extension(prometheus_handle));

    // Build CORS layer
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .nest("/api", routes::api_routes::<L, D>())
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
