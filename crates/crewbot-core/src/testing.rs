//! Testing helpers and mock utilities.
//!
//! Provides convenient constructors for mocked LLM providers and clients.

use crate::config::AgentSettings;
use crate::llm::{ChatResponse, LlmClient, LlmProvider, MockLlmProvider, ToolCall, ToolCallFunction};
use mockall::predicate::always;
use std::sync::Arc;

/// Provider name the mock is registered under
pub const MOCK_PROVIDER: &str = "mock";

/// Create a mock LLM provider whose `chat_completion` always returns `response_text`.
#[must_use]
pub fn mock_llm_simple(response_text: &'static str) -> MockLlmProvider {
    let mut mock = MockLlmProvider::new();
    mock.expect_chat_completion()
        .with(always(), always(), always(), always(), always())
        .returning(move |_, _, _, _, _| Ok(response_text.to_string()));
    mock
}

/// Wrap `provider` in a client that routes every call to it.
#[must_use]
pub fn client_with(provider: impl LlmProvider + 'static) -> LlmClient {
    let settings = AgentSettings {
        llm_provider: Some(MOCK_PROVIDER.to_string()),
        ..AgentSettings::default()
    };
    let mut client = LlmClient::new(&settings);
    client.register_provider(MOCK_PROVIDER.to_string(), Arc::new(provider));
    client
}

/// A final text answer
#[must_use]
pub fn text_response(content: &str) -> ChatResponse {
    ChatResponse {
        content: Some(content.to_string()),
        tool_calls: Vec::new(),
        finish_reason: "stop".to_string(),
        usage: None,
    }
}

/// A turn requesting a single tool call
#[must_use]
pub fn tool_call_response(id: &str, name: &str, arguments: &str) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            function: ToolCallFunction {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }],
        finish_reason: "tool_calls".to_string(),
        usage: None,
    }
}
