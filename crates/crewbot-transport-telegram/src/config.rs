//! Telegram transport settings.

use config::ConfigError;
use crewbot_core::config::AgentSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramSettings {
    /// Telegram Bot API token (`TELEGRAM_BOT_TOKEN`).
    pub telegram_bot_token: String,
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = crewbot_core::config::build_config()?.try_deserialize()?;
        if settings.telegram_bot_token.trim().is_empty() {
            return Err(ConfigError::NotFound("telegram_bot_token".to_string()));
        }
        Ok(settings)
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Agent settings shared across transport handlers.
    pub agent: Arc<AgentSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(agent: AgentSettings, telegram: TelegramSettings) -> Self {
        Self {
            agent: Arc::new(agent),
            telegram: Arc::new(telegram),
        }
    }
}
