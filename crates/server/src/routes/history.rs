//! Conversation window inspection

use axum::{
    Json,
    extract::{Path, State},
};
use billing_core::Exchange;
use serde::Serialize;

use crate::AppState;
use crate::error::AppError;

/// Response body for a user's recent exchanges
#[derive(Serialize)]
pub struct HistoryResponse {
    user_id: i64,
    window: usize,
    exchanges: Vec<Exchange>,
}

/// GET /api/history/{user_id} - Recent exchanges, oldest first
pub async fn get<L, D>(
    State(state): State<AppState<L, D>>,
    Path(user_id): Path<i64>,
) -> Result<Json<HistoryResponse>, AppError>
where
    L: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    let memory = state
        .sessions
        .snapshot(user_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No conversation for user {}", user_id)))?;

    Ok(Json(HistoryResponse {
        user_id,
        window: memory.window(),
        exchanges: memory.exchanges().cloned().collect(),
    }))
}
