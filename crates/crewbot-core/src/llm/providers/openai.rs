use crate::config::CHAT_TEMPERATURE;
use crate::llm::common::{
    build_openai_messages, extract_openai_response, parse_tool_response,
    prepare_structured_messages, prepare_tools_json,
};
use crate::llm::http_utils::{create_llm_http_client, send_json_request};
use crate::llm::{ChatResponse, LlmError, LlmProvider, Message, ToolDefinition};
use async_openai::{config::OpenAIConfig, types::chat::CreateChatCompletionRequestArgs, Client};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use tracing::debug;

/// Provider for any OpenAI-compatible chat completions endpoint
pub struct OpenAiCompatProvider {
    client: Client<OpenAIConfig>,
    http_client: HttpClient,
    api_key: String,
    api_base: String,
}

impl OpenAiCompatProvider {
    /// Create a new provider for the given key and base URL
    #[must_use]
    pub fn new(api_key: String, api_base: String) -> Self {
        let api_base = api_base.trim_end_matches('/').to_string();
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(api_base.clone());
        Self {
            client: Client::with_config(config),
            http_client: create_llm_http_client(),
            api_key,
            api_base,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat_completion(
        &self,
        system_prompt: &str,
        history: &[Message],
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let messages = build_openai_messages(system_prompt, history, user_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model_id)
            .messages(messages)
            .max_tokens(max_tokens)
            .temperature(CHAT_TEMPERATURE)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        extract_openai_response(&response)
    }

    async fn chat_with_tools(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        model_id: &str,
        max_tokens: u32,
    ) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.api_base);

        let mut body = json!({
            "model": model_id,
            "messages": prepare_structured_messages(system_prompt, messages),
            "max_tokens": max_tokens,
            "temperature": CHAT_TEMPERATURE
        });

        if !tools.is_empty() {
            body["tools"] = json!(prepare_tools_json(tools));
            body["tool_choice"] = json!("auto");
        }

        debug!(model = model_id, tools_count = tools.len(), "Posting tool-enabled request");

        let auth = format!("Bearer {}", self.api_key);
        let res_json = send_json_request(&self.http_client, &url, &body, Some(&auth)).await?;

        parse_tool_response(&res_json)
    }
}
