use super::formatting::{format_response, ERROR_MESSAGE, HELP_MESSAGE, START_MESSAGE};
use super::messaging::send_long_message;
use super::resilient::{send_message_resilient, send_typing_safe};
use anyhow::Result;
use crewbot_core::agent::Crew;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{debug, error, info};

/// Helper function to get user ID from Message safely
///
/// Returns 0 for channel posts, which carry no sender.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Greet the user
    #[command(description = "Start the bot.")]
    Start,
    /// List the commands
    #[command(description = "Show this help message.")]
    Help,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the greeting cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    info!(user_id = get_user_id_safe(&msg), "User issued /start");
    send_message_resilient(&bot, msg.chat.id, START_MESSAGE).await?;
    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the help text cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    info!(user_id = get_user_id_safe(&msg), "User issued /help");
    send_message_resilient(&bot, msg.chat.id, HELP_MESSAGE).await?;
    Ok(())
}

/// Text message handler
///
/// Runs the crew on the message and replies with the cleaned answer, or
/// with a generic apology if the run fails.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_text(bot: Bot, msg: Message, crew: Arc<Crew>) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let user_id = get_user_id_safe(&msg);
    info!(user_id, chars = text.chars().count(), "Received message");

    send_typing_safe(&bot, msg.chat.id).await;

    let reply = match crew.kickoff(text).await {
        Ok(raw) => {
            debug!(user_id, raw = %raw, "Crew finished");
            format_response(&raw, text)
        }
        Err(e) => {
            error!(user_id, error = %e, "Error processing message");
            ERROR_MESSAGE.to_string()
        }
    };

    send_long_message(&bot, msg.chat.id, &reply).await?;
    info!(user_id, "Response sent");
    Ok(())
}
