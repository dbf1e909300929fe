//! Common messaging utilities for the Telegram bot.

use super::resilient::send_message_resilient;
use anyhow::Result;
use crewbot_core::utils::split_long_message;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Maximum message length for Telegram with safety margin.
/// Telegram's official limit is 4096.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Sends a long message by splitting it into multiple parts.
///
/// # Errors
///
/// Returns an error if any part fails to send after retries.
pub async fn send_long_message(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    for part in split_long_message(text, TELEGRAM_MESSAGE_LIMIT) {
        send_message_resilient(bot, chat_id, part).await?;
    }
    Ok(())
}
