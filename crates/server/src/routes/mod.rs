mod ask;
pub mod health;
mod history;
pub mod metrics;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;
use crate::ai::CompletionService;
use crate::db::SqlDatabase;

/// Build the question-answering API routes
pub fn api_routes<L, D>() -> Router<AppState<L, D>>
where
    L: CompletionService + 'static,
    D: SqlDatabase + 'static,
{
    Router::new()
        .route("/ask", post(ask::ask::<L, D>))
        .route("/history/{user_id}", get(history::get::<L, D>))
}
