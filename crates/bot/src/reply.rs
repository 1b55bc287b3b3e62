use billing_core::PipelineResult;

use crate::error::BotError;

pub const GREETING: &str = "Hello! Ask your question and I'll answer it!";
pub const REPHRASE: &str = "Please, rephrase your question";
pub const CSV_FILE_NAME: &str = "output.csv";

/// What the bot sends back for one answered question
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// CSV payload sent as an `output.csv` document
    Document(Vec<u8>),
}

impl Reply {
    /// Text when the server phrased an answer, otherwise the CSV export
    pub fn from_result(result: PipelineResult) -> Result<Self, BotError> {
        if !result.answer.is_empty() {
            Ok(Reply::Text(result.answer))
        } else if !result.csv_file.is_empty() {
            Ok(Reply::Document(result.csv_file.into_bytes()))
        } else {
            Err(BotError::EmptyResult)
        }
    }
}

/// `/start`, optionally addressed as `/start@botname`
pub fn is_start_command(text: &str) -> bool {
    match text.split_whitespace().next() {
        Some(cmd) => cmd == "/start" || cmd.starts_with("/start@"),
        None => false,
    }
}

/// Conversation key for a message: the sender, or the chat for anonymous posts
pub fn user_id(sender: Option<u64>, chat_id: i64) -> i64 {
    sender
        .and_then(|id| i64::try_from(id).ok())
        .unwrap_or(chat_id)
}
