//! LLM providers and client
//!
//! Provides a unified interface to OpenAI-compatible chat completion
//! endpoints, used both as the intent-classification oracle and as the
//! tool-calling backend of the agents.

mod common;
mod http_utils;
/// Implementations of specific LLM providers
pub mod providers;

pub use http_utils::create_http_client;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, trace, warn};

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// Error returned by the provider's API
    #[error("API error: {0}")]
    ApiError(String),
    /// Error during network communication
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Error during JSON serialization or deserialization
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Missing provider configuration or API key
    #[error("Missing client/API key: {0}")]
    MissingConfig(String),
    /// Any other unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A message in an LLM conversation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    /// Role of the message sender (user, assistant, system, tool)
    pub role: String,
    /// Text content of the message
    pub content: String,
    /// Tool call ID (for tool responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls made by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    /// Create a new user message
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    /// Create a new assistant message with tool calls
    #[must_use]
    pub fn assistant_with_tools(content: &str, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
            tool_call_id: None,
            tool_calls: Some(tool_calls),
        }
    }

    /// Create a new tool response message
    #[must_use]
    pub fn tool(tool_call_id: &str, content: &str) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.to_string(),
            tool_call_id: Some(tool_call_id.to_string()),
            tool_calls: None,
        }
    }
}

/// Tool definition for LLM function calling
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON schema for tool parameters
    pub parameters: serde_json::Value,
}

/// Tool call from LLM response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for the tool call
    pub id: String,
    /// Function to be called
    #[serde(rename = "function")]
    pub function: ToolCallFunction,
}

/// Function details within a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallFunction {
    /// Name of the function being called
    pub name: String,
    /// Arguments for the function call (JSON string)
    pub arguments: String,
}

/// Token usage statistics from API response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    /// Input tokens
    pub prompt_tokens: u32,
    /// Output tokens
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

/// Chat response that may include tool calls
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Optional text content of the response
    pub content: Option<String>,
    /// List of tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// Reason why the model stopped generating
    pub finish_reason: String,
    /// Token usage statistics (if provided by the API)
    pub usage: Option<TokenUsage>,
}

/// Interface for all LLM providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a plain chat completion
    async fn chat_completion(
        &self,
        system_prompt: &str,
        history: &[Message],
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Chat completion with tool calling support
    ///
    /// Default implementation returns an error indicating tool calling is not supported.
    async fn chat_with_tools(
        &self,
        _system_prompt: &str,
        _messages: &[Message],
        _tools: &[ToolDefinition],
        _model_id: &str,
        _max_tokens: u32,
    ) -> Result<ChatResponse, LlmError> {
        Err(LlmError::Unknown(
            "Tool calling not supported by this provider".to_string(),
        ))
    }
}

/// Unified client routing requests to the configured provider
pub struct LlmClient {
    openai: Option<providers::OpenAiCompatProvider>,
    custom_providers: HashMap<String, Arc<dyn LlmProvider>>,
    /// Provider name requests are sent to
    pub provider_name: String,
    /// Model used by agents
    pub chat_model: String,
    /// Model used by the intent router
    pub router_model: String,
    /// Output token cap per completion
    pub max_tokens: u32,
}

impl LlmClient {
    /// Create a new LLM client with providers configured from settings
    #[must_use]
    pub fn new(settings: &crate::config::AgentSettings) -> Self {
        Self {
            openai: settings.llm_api_key().map(|key| {
                providers::OpenAiCompatProvider::new(key.to_string(), settings.llm_api_base())
            }),
            custom_providers: HashMap::new(),
            provider_name: settings.llm_provider(),
            chat_model: settings.chat_model(),
            router_model: settings.router_model(),
            max_tokens: settings.chat_max_tokens(),
        }
    }

    /// Register a custom/mock LLM provider
    pub fn register_provider(&mut self, name: String, provider: Arc<dyn LlmProvider>) {
        self.custom_providers.insert(name, provider);
    }

    /// Returns true if the configured provider can serve requests.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.get_provider().is_ok()
    }

    /// Returns the configured provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` if the provider is not configured.
    fn get_provider(&self) -> Result<&dyn LlmProvider, LlmError> {
        if let Some(provider) = self.custom_providers.get(&self.provider_name) {
            return Ok(provider.as_ref());
        }
        match self.provider_name.as_str() {
            "openai" => self.openai.as_ref().map(|p| p as &dyn LlmProvider),
            _ => None,
        }
        .ok_or_else(|| LlmError::MissingConfig(self.provider_name.clone()))
    }

    /// Perform a chat completion request
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` if no provider is configured, or any error from the provider.
    #[instrument(skip(self, system_prompt, history, user_message))]
    pub async fn chat_completion(
        &self,
        system_prompt: &str,
        history: &[Message],
        user_message: &str,
        model_id: &str,
    ) -> Result<String, LlmError> {
        let provider = self.get_provider()?;

        debug!(
            model = model_id,
            provider = %self.provider_name,
            "Sending request to LLM"
        );
        trace!(
            system_prompt = system_prompt,
            history = ?history,
            user_message = user_message,
            "Full LLM Request"
        );

        let start = std::time::Instant::now();
        let result = provider
            .chat_completion(
                system_prompt,
                history,
                user_message,
                model_id,
                self.max_tokens,
            )
            .await;
        let duration = start.elapsed();

        match &result {
            Ok(resp) => {
                debug!(
                    model = model_id,
                    duration_ms = duration.as_millis(),
                    "Received success response from LLM"
                );
                trace!(response = ?resp, "Full LLM Response");
            }
            Err(e) => {
                warn!(
                    model = model_id,
                    duration_ms = duration.as_millis(),
                    error = %e,
                    "Received error response from LLM"
                );
            }
        }

        result
    }

    /// Chat completion with tool calling support (for agent turns)
    ///
    /// A single attempt is made; failures are returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` if no provider is configured, or any error from the provider.
    #[instrument(skip(self, system_prompt, messages, tools))]
    pub async fn chat_with_tools(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        model_id: &str,
    ) -> Result<ChatResponse, LlmError> {
        let provider = self.get_provider()?;

        debug!(
            model = model_id,
            provider = %self.provider_name,
            tools_count = tools.len(),
            messages_count = messages.len(),
            "Sending tool-enabled request to LLM"
        );

        let start = std::time::Instant::now();
        let result = provider
            .chat_with_tools(system_prompt, messages, tools, model_id, self.max_tokens)
            .await;
        let duration = start.elapsed();

        match &result {
            Ok(resp) => {
                debug!(
                    model = model_id,
                    duration_ms = duration.as_millis(),
                    tool_calls_count = resp.tool_calls.len(),
                    finish_reason = %resp.finish_reason,
                    "Received tool response from LLM"
                );
                if let Some(usage) = &resp.usage {
                    trace!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        total_tokens = usage.total_tokens,
                        "Token usage"
                    );
                }
            }
            Err(e) => {
                info!(
                    model = model_id,
                    duration_ms = duration.as_millis(),
                    error = %e,
                    "Tool-enabled LLM request failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentSettings;

    #[test]
    fn test_client_without_key_is_unavailable() {
        let client = LlmClient::new(&AgentSettings::default());
        assert!(!client.is_available());
    }

    #[test]
    fn test_client_with_key_is_available() {
        let settings = AgentSettings {
            llm_api_key: Some("sk-test".to_string()),
            ..AgentSettings::default()
        };
        let client = LlmClient::new(&settings);
        assert!(client.is_available());
        assert_eq!(client.chat_model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_missing_provider_is_reported() {
        let settings = AgentSettings {
            llm_provider: Some("nowhere".to_string()),
            ..AgentSettings::default()
        };
        let client = LlmClient::new(&settings);
        let err = client
            .chat_completion("sys", &[], "hi", "model")
            .await
            .err();
        assert!(matches!(err, Some(LlmError::MissingConfig(name)) if name == "nowhere"));
    }

    #[tokio::test]
    async fn test_registered_mock_provider_is_used() {
        let mut mock = MockLlmProvider::new();
        mock.expect_chat_completion()
            .returning(|_, _, _, _, _| Ok("general".to_string()));

        let settings = AgentSettings {
            llm_provider: Some("mock".to_string()),
            ..AgentSettings::default()
        };
        let mut client = LlmClient::new(&settings);
        client.register_provider("mock".to_string(), Arc::new(mock));

        let reply = client.chat_completion("sys", &[], "hi", "model").await;
        assert_eq!(reply.ok().as_deref(), Some("general"));
    }
}
