//! Resilient messaging with automatic retry for Telegram API operations.
//!
//! Wraps outbound calls so transient network failures are retried with
//! exponential backoff and jitter.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, Message};
use tracing::{debug, warn};

/// Send a plain-text message, retrying on network failures.
///
/// Uses [`crewbot_core::utils::retry_transport_operation`].
///
/// # Errors
///
/// Returns the last error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
) -> Result<Message> {
    let text = text.into();
    crewbot_core::utils::retry_transport_operation(|| async {
        bot.send_message(chat_id, text.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Show the typing indicator. Failures are logged and ignored.
pub async fn send_typing_safe(bot: &Bot, chat_id: ChatId) {
    match bot.send_chat_action(chat_id, ChatAction::Typing).await {
        Ok(_) => debug!(chat_id = chat_id.0, "Typing indicator sent"),
        Err(e) => warn!(chat_id = chat_id.0, error = %e, "Failed to send typing indicator"),
    }
}
