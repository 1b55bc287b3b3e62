//! billing-bot: Telegram front end for the billing assistant.
//!
//! Relays every text message to the server's ask endpoint and sends back
//! either the phrased answer or the CSV export as a document.

mod client;
mod error;
mod reply;

use clap::Parser;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, KeyboardButton, KeyboardMarkup};

use billing_core::Question;

use client::{AskClient, DEFAULT_ASK_URL};
use error::BotError;
use reply::{CSV_FILE_NAME, GREETING, REPHRASE, Reply, is_start_command, user_id};

#[derive(Parser)]
#[command(name = "billing-bot", about = "Telegram bot for billing questions")]
struct Args {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN")]
    telegram_token: String,

    /// Ask endpoint of the billing server
    #[arg(long, env = "ASK_API_URL", default_value = DEFAULT_ASK_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let client = AskClient::new(args.api_url).expect("Failed to build HTTP client");
    let bot = Bot::new(args.telegram_token);

    tracing::info!(api_url = %client.url(), "Starting billing bot");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let client = client.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            if is_start_command(text) {
                if let Err(e) = greet(&bot, &msg).await {
                    tracing::error!(chat_id = msg.chat.id.0, error = %e, "Failed to send greeting");
                }
                return respond(());
            }

            if let Err(e) = answer(&bot, &msg, text, &client).await {
                tracing::warn!(chat_id = msg.chat.id.0, error = %e, "Question failed");
                if let Err(e) = bot.send_message(msg.chat.id, REPHRASE).await {
                    tracing::error!(chat_id = msg.chat.id.0, error = %e, "Failed to send fallback");
                }
            }
            respond(())
        }
    })
    .await;
}

async fn greet(bot: &Bot, msg: &Message) -> Result<(), BotError> {
    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;

    let keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new("/start")]])
        .resize_keyboard()
        .one_time_keyboard();
    bot.send_message(msg.chat.id, GREETING)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn answer(bot: &Bot, msg: &Message, text: &str, client: &AskClient) -> Result<(), BotError> {
    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;

    let sender = msg.from.as_ref().map(|user| user.id.0);
    let question = Question::new(user_id(sender, msg.chat.id.0), text, None);
    tracing::info!(user_id = question.user_id, "Relaying question");

    let result = client.ask(&question).await?;
    match Reply::from_result(result)? {
        Reply::Text(answer) => {
            bot.send_message(msg.chat.id, answer).await?;
        }
        Reply::Document(csv) => {
            let file = InputFile::memory(csv).file_name(CSV_FILE_NAME);
            bot.send_document(msg.chat.id, file).await?;
        }
    }
    Ok(())
}
