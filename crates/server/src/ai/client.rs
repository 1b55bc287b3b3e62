//! Claude API client for the Anthropic Messages API

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::CompletionService;
use crate::error::LlmError;

pub const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const MAX_TOKENS: u32 = 1024;

/// Client for the Anthropic Claude Messages API
#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Individual content block within a response
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<&'a str>,
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[allow(dead_code)]
    pub id: String,
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Error detail from the Messages API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ClaudeClient {
    /// Create a new client with the given API key
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_url: API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Bound every request, connect through last body byte
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Send one user prompt and return the raw API response
    pub async fn send(&self, prompt: &str, stop: &[&str]) -> Result<ApiResponse, LlmError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stop_sequences: stop.to_vec(),
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(api_err) => api_err.error.message,
                Err(_) => body,
            };
            return Err(LlmError::Api { status, message });
        }

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))
    }

    /// Extract text content from an API response
    pub fn extract_text(&self, response: &ApiResponse) -> Result<String, LlmError> {
        response
            .content
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.clone()),
                ContentBlock::Other => None,
            })
            .ok_or(LlmError::EmptyCompletion)
    }
}

impl CompletionService for ClaudeClient {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, LlmError> {
        let response = self.send(prompt, stop).await?;

        tracing::debug!(
            model = %self.model,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            "Completion received"
        );

        self.extract_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_text_block() {
        let response: ApiResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": " SELECT count(*) FROM claim"}
            ],
            "stop_reason": "stop_sequence"
        }))
        .unwrap();

        let client = ClaudeClient::new("key".to_string());
        assert_eq!(
            client.extract_text(&response).unwrap(),
            " SELECT count(*) FROM claim"
        );
    }

    #[test]
    fn empty_content_is_an_error() {
        let response: ApiResponse =
            serde_json::from_value(serde_json::json!({"id": "msg_1", "content": []})).unwrap();
        let client = ClaudeClient::new("key".to_string());
        assert!(matches!(
            client.extract_text(&response),
            Err(LlmError::EmptyCompletion)
        ));
    }

    #[test]
    fn request_carries_stop_sequences() {
        let request = ApiRequest {
            model: DEFAULT_MODEL,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            messages: vec![],
            stop_sequences: vec!["\nSQLResult:"],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stop_sequences"][0], "\nSQLResult:");
        assert_eq!(json["temperature"], 0.0);
    }
}
