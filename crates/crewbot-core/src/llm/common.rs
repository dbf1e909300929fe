//! Common utilities for LLM providers
//!
//! Shared helper functions for building messages and parsing responses of
//! OpenAI-compatible APIs.

use super::{ChatResponse, LlmError, Message, TokenUsage, ToolCall, ToolDefinition};
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionResponse,
};
use serde_json::{json, Value};

/// Build a list of chat messages for OpenAI-compatible APIs
///
/// # Errors
///
/// Returns `LlmError::Unknown` if message building fails.
pub fn build_openai_messages(
    system_prompt: &str,
    history: &[Message],
    user_message: &str,
) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
    let mut messages = vec![ChatCompletionRequestSystemMessageArgs::default()
        .content(system_prompt)
        .build()
        .map_err(|e| LlmError::Unknown(e.to_string()))?
        .into()];

    for msg in history {
        let m = match msg.role.as_str() {
            "user" => ChatCompletionRequestUserMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map_err(|e| LlmError::Unknown(e.to_string()))?
                .into(),
            _ => ChatCompletionRequestAssistantMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map_err(|e| LlmError::Unknown(e.to_string()))?
                .into(),
        };
        messages.push(m);
    }

    messages.push(
        ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?
            .into(),
    );

    Ok(messages)
}

/// Extract text content from an OpenAI-compatible chat completion response
///
/// # Errors
///
/// Returns `LlmError::ApiError` if the response is empty.
pub fn extract_openai_response(
    response: &CreateChatCompletionResponse,
) -> Result<String, LlmError> {
    response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| LlmError::ApiError("Empty response".to_string()))
}

/// Build the raw JSON message list for a tool-enabled request
pub fn prepare_structured_messages(system_prompt: &str, history: &[Message]) -> Vec<Value> {
    let mut messages = vec![json!({
        "role": "system",
        "content": system_prompt
    })];

    for msg in history {
        match msg.role.as_str() {
            "assistant" => {
                let mut m = json!({
                    "role": "assistant",
                    "content": msg.content
                });

                if let Some(tool_calls) = &msg.tool_calls {
                    let api_tool_calls: Vec<Value> = tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "id": tc.id,
                                "type": "function",
                                "function": {
                                    "name": tc.function.name,
                                    "arguments": tc.function.arguments
                                }
                            })
                        })
                        .collect();

                    if !api_tool_calls.is_empty() {
                        m["tool_calls"] = json!(api_tool_calls);
                    }
                }

                messages.push(m);
            }
            "tool" => {
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": msg.tool_call_id,
                    "content": msg.content
                }));
            }
            role => {
                messages.push(json!({
                    "role": if role == "system" { "system" } else { "user" },
                    "content": msg.content
                }));
            }
        }
    }
    messages
}

/// Convert tool definitions into the OpenAI `tools` array
pub fn prepare_tools_json(tools: &[ToolDefinition]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters
                }
            })
        })
        .collect()
}

/// Parse an OpenAI-compatible tool-enabled response body
///
/// # Errors
///
/// Returns `LlmError::JsonError` on malformed `tool_calls`, or
/// `LlmError::ApiError` if the response has neither content nor tool calls.
pub fn parse_tool_response(res_json: &Value) -> Result<ChatResponse, LlmError> {
    let message = res_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"));

    let content = message
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let tool_calls: Vec<ToolCall> = match message.and_then(|m| m.get("tool_calls")) {
        Some(value) if value.is_null() => Vec::new(),
        Some(value) if value.is_array() => serde_json::from_value(value.clone())
            .map_err(|e| LlmError::JsonError(e.to_string()))?,
        Some(_) => {
            return Err(LlmError::JsonError(
                "Invalid tool_calls format in response".to_string(),
            ))
        }
        None => Vec::new(),
    };

    if content.is_none() && tool_calls.is_empty() {
        return Err(LlmError::ApiError("Empty response".to_string()));
    }

    let finish_reason = res_json["choices"][0]["finish_reason"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();

    let usage = res_json.get("usage").and_then(|u| {
        Some(TokenUsage {
            prompt_tokens: u32::try_from(u.get("prompt_tokens")?.as_u64()?).ok()?,
            completion_tokens: u32::try_from(u.get("completion_tokens")?.as_u64()?).ok()?,
            total_tokens: u32::try_from(u.get("total_tokens")?.as_u64()?).ok()?,
        })
    });

    Ok(ChatResponse {
        content,
        tool_calls,
        finish_reason,
        usage,
    })
}
