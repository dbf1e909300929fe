//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! runtime constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Core settings loaded from config files and environment variables
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AgentSettings {
    /// Name of the LLM provider serving completions
    pub llm_provider: Option<String>,
    /// API key for the OpenAI-compatible reasoning endpoint
    pub llm_api_key: Option<String>,
    /// Legacy key name, read when `llm_api_key` is unset
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible endpoint
    pub llm_api_base: Option<String>,
    /// Model used by the agents
    pub chat_model_id: Option<String>,
    /// Model used by the intent router (defaults to the chat model)
    pub router_model_id: Option<String>,
    /// Output token cap per completion
    pub chat_max_tokens: Option<u32>,

    /// OpenWeather API key
    pub openweather_api_key: Option<String>,
    /// OpenWeather base URL override
    pub weather_api_base: Option<String>,
    /// SerpApi key
    pub serpapi_key: Option<String>,
    /// SerpApi base URL override
    pub search_api_base: Option<String>,

    /// Path of the appointments JSON file
    pub appointments_file: Option<String>,
    /// Maximum tool-calling turns per agent run
    pub agent_max_iterations: Option<usize>,
}

/// Build the layered configuration source shared by all settings structs.
///
/// Order: `config/default`, `config/<RUN_MODE>`, `config/local`, `APP__`
/// prefixed environment, then plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE env vars map to snake_case keys; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl AgentSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// API key for the reasoning endpoint, preferring `LLM_API_KEY`
    #[must_use]
    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm_api_key
            .as_deref()
            .or(self.openai_api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Name of the provider serving completions
    #[must_use]
    pub fn llm_provider(&self) -> String {
        self.llm_provider
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_LLM_PROVIDER.to_string())
    }

    /// Base URL of the reasoning endpoint
    #[must_use]
    pub fn llm_api_base(&self) -> String {
        self.llm_api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string())
    }

    /// Model identifier used by the agents
    #[must_use]
    pub fn chat_model(&self) -> String {
        self.chat_model_id
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string())
    }

    /// Model identifier used for intent classification
    #[must_use]
    pub fn router_model(&self) -> String {
        self.router_model_id
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.chat_model())
    }

    /// Output token cap per completion
    #[must_use]
    pub fn chat_max_tokens(&self) -> u32 {
        self.chat_max_tokens.unwrap_or(DEFAULT_CHAT_MAX_TOKENS)
    }

    /// OpenWeather base URL
    #[must_use]
    pub fn weather_api_base(&self) -> String {
        self.weather_api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_WEATHER_API_BASE.to_string())
    }

    /// SerpApi base URL
    #[must_use]
    pub fn search_api_base(&self) -> String {
        self.search_api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_SEARCH_API_BASE.to_string())
    }

    /// Path of the appointments file
    #[must_use]
    pub fn appointments_file(&self) -> String {
        self.appointments_file
            .clone()
            .unwrap_or_else(|| DEFAULT_APPOINTMENTS_FILE.to_string())
    }

    /// Maximum tool-calling turns per agent run
    #[must_use]
    pub fn agent_max_iterations(&self) -> usize {
        self.agent_max_iterations
            .filter(|n| *n > 0)
            .unwrap_or(AGENT_MAX_ITERATIONS)
    }
}

/// Provider name of the built-in OpenAI-compatible client
pub const DEFAULT_LLM_PROVIDER: &str = "openai";
/// Default OpenAI-compatible endpoint
pub const DEFAULT_LLM_API_BASE: &str = "https://api.openai.com/v1";
/// Default model for agents and routing
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
/// Default output token cap
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 4096;
/// Sampling temperature for agent turns and routing
pub const CHAT_TEMPERATURE: f32 = 0.0;
/// Default OpenWeather endpoint
pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.openweathermap.org";
/// Default SerpApi endpoint
pub const DEFAULT_SEARCH_API_BASE: &str = "https://serpapi.com";
/// Default appointments file
pub const DEFAULT_APPOINTMENTS_FILE: &str = "appointments.json";
/// Maximum tool-calling turns per agent run
pub const AGENT_MAX_ITERATIONS: usize = 8;

/// Default timeout for LLM HTTP requests
pub const LLM_HTTP_TIMEOUT_SECS: u64 = 60;
/// Default timeout for tool HTTP requests
pub const TOOL_HTTP_TIMEOUT_SECS: u64 = 30;

// Telegram send retry
/// Maximum attempts for a Telegram API call
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff between Telegram API attempts
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Backoff ceiling between Telegram API attempts
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;

/// Get LLM HTTP timeout from env or default.
///
/// Environment variable: `LLM_HTTP_TIMEOUT_SECS`.
#[must_use]
pub fn get_llm_http_timeout_secs() -> u64 {
    std::env::var("LLM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LLM_HTTP_TIMEOUT_SECS)
}

/// Get tool HTTP timeout from env or default.
///
/// Environment variable: `TOOL_HTTP_TIMEOUT_SECS`.
#[must_use]
pub fn get_tool_http_timeout_secs() -> u64 {
    std::env::var("TOOL_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(TOOL_HTTP_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let settings = AgentSettings::default();
        assert_eq!(settings.chat_model(), DEFAULT_CHAT_MODEL);
        assert_eq!(settings.router_model(), DEFAULT_CHAT_MODEL);
        assert_eq!(settings.llm_api_base(), DEFAULT_LLM_API_BASE);
        assert_eq!(settings.llm_provider(), "openai");
        assert_eq!(settings.appointments_file(), "appointments.json");
        assert_eq!(settings.agent_max_iterations(), AGENT_MAX_ITERATIONS);
        assert!(settings.llm_api_key().is_none());
    }

    #[test]
    fn test_llm_key_fallback_order() {
        let mut settings = AgentSettings {
            openai_api_key: Some("sk-openai".to_string()),
            ..AgentSettings::default()
        };
        assert_eq!(settings.llm_api_key(), Some("sk-openai"));

        settings.llm_api_key = Some("sk-primary".to_string());
        assert_eq!(settings.llm_api_key(), Some("sk-primary"));
    }

    #[test]
    fn test_router_model_override() {
        let settings = AgentSettings {
            chat_model_id: Some("big-model".to_string()),
            router_model_id: Some("small-model".to_string()),
            ..AgentSettings::default()
        };
        assert_eq!(settings.chat_model(), "big-model");
        assert_eq!(settings.router_model(), "small-model");
    }

    #[test]
    fn test_zero_iterations_falls_back() {
        let settings = AgentSettings {
            agent_max_iterations: Some(0),
            ..AgentSettings::default()
        };
        assert_eq!(settings.agent_max_iterations(), AGENT_MAX_ITERATIONS);
    }
}
