//! LLM completion service

pub mod client;

pub use client::ClaudeClient;

use std::future::Future;

use crate::error::LlmError;

/// Text completion capability the pipeline depends on
pub trait CompletionService: Send + Sync {
    /// Complete `prompt`, stopping before any of the `stop` markers
    fn complete(
        &self,
        prompt: &str,
        stop: &[&str],
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}
