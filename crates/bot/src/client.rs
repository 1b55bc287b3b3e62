use std::time::Duration;

use billing_core::{PipelineResult, Question};

use crate::error::BotError;

pub const DEFAULT_ASK_URL: &str = "http://localhost:8000/api/ask";

/// Two LLM calls plus a query can take a while
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the billing server's `/api/ask` endpoint
#[derive(Clone)]
pub struct AskClient {
    http: reqwest::Client,
    url: String,
}

impl AskClient {
    pub fn new(url: impl Into<String>) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post one question and decode the pipeline result
    pub async fn ask(&self, question: &Question) -> Result<PipelineResult, BotError> {
        let result = self
            .http
            .post(&self.url)
            .json(question)
            .send()
            .await?
            .error_for_status()?
            .json::<PipelineResult>()
            .await?;
        Ok(result)
    }
}
