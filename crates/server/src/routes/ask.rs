//! Question answering endpoint

use axum::{Extension, Json, extract::State};
use billing_core::{PipelineResult, Question};

use crate::AppState;
use crate::ai::CompletionService;
use crate::db::SqlDatabase;
use crate::error::AppError;
use crate::middleware::RequestId;

/// What the conversation window remembers for a CSV reply
const CSV_REPLY: &str = "[csv export]";

/// POST /api/ask - Answer a billing question
///
/// Body `{user_id, message, provider_id}`. Requests from the same user are
/// handled one at a time.
pub async fn ask<L, D>(
    State(state): State<AppState<L, D>>,
    Extension(request_id): Extension<RequestId>,
    Json(question): Json<Question>,
) -> Result<Json<PipelineResult>, AppError>
where
    L: CompletionService + 'static,
    D: SqlDatabase + 'static,
{
    if question.text.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    tracing::info!(
        user_id = question.user_id,
        provider_id = ?question.provider_id,
        "Question received"
    );

    let mut memory = state.sessions.acquire(question.user_id).await;

    let result = state.pipeline.answer(&question).await.map_err(|e| {
        tracing::error!(
            request_id = %request_id.0,
            user_id = question.user_id,
            error = %e,
            "Pipeline failed"
        );
        AppError::from(e)
    })?;

    let reply = if result.answer.is_empty() {
        CSV_REPLY
    } else {
        result.answer.as_str()
    };
    memory.record(result.input_text.clone(), reply);

    Ok(Json(result))
}
