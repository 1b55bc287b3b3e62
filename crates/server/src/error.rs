//! Application error handling

use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use billing_core::BillingError;
use serde::Serialize;
use thiserror::Error;

/// Failure talking to the completion service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("No text content in response")]
    EmptyCompletion,
}

/// Failure talking to the billing database
#[derive(Debug, Error)]
pub enum DbError {
    /// The database rejected the generated statement
    #[error("{0}")]
    Execution(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Schema introspection failed: {0}")]
    Introspection(String),
}

impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        DbError::Unavailable(format!("Database pool error: {}", err))
    }
}

/// Anything that stops the pipeline from producing a result
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Format(#[from] BillingError),
}

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid database config: {0}")]
    Invalid(String),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// The LLM service failed; the caller should ask the user to rephrase
    Upstream(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "llm_unavailable", msg),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "database_unavailable", msg)
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Llm(e) => AppError::Upstream(e.to_string()),
            PipelineError::Database(e @ DbError::Unavailable(_)) => {
                AppError::Unavailable(e.to_string())
            }
            PipelineError::Database(e) => AppError::Internal(e.to_string()),
            PipelineError::Format(e) => AppError::Internal(e.to_string()),
        }
    }
}
