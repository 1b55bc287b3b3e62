//! Prometheus metrics endpoint

use axum::{Extension, extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::AppState;

/// GET /metrics - Render collected metrics in Prometheus text format
///
/// The open conversation window count is sampled at scrape time.
pub async fn get<L, D>(
    State(state): State<AppState<L, D>>,
    Extension(handle): Extension<PrometheusHandle>,
) -> impl IntoResponse
where
    L: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    metrics::gauge!("conversation_windows").set(state.sessions.len() as f64);
    handle.render()
}
