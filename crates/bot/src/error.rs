/// Errors while relaying a chat message to the ask endpoint
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("ask endpoint request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("ask endpoint returned neither an answer nor a CSV export")]
    EmptyResult,
}
