//! Tool-calling loop for a single agent.

use super::profile::AgentProfile;
use super::CrewError;
use crate::llm::{LlmClient, Message, ToolCall};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs one agent until it answers without calling tools
pub struct AgentRunner {
    llm: Arc<LlmClient>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
}

impl AgentRunner {
    /// Create a runner over a shared client and tool table
    #[must_use]
    pub fn new(llm: Arc<LlmClient>, tools: Arc<ToolRegistry>, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
        }
    }

    /// Execute `task` as `profile`.
    ///
    /// Each turn sends the conversation and the agent's tool subset to the
    /// model. Requested tools are run and their output appended; a turn
    /// without tool calls ends the run with its text.
    ///
    /// # Errors
    ///
    /// Returns `CrewError::Llm` if a model call fails,
    /// `CrewError::EmptyAnswer` if the final turn has no text, or
    /// `CrewError::IterationLimit` if the turn cap is reached.
    pub async fn run(&self, profile: &AgentProfile, task: &str) -> Result<String, CrewError> {
        let system_prompt = profile.system_prompt();
        let tools = self.tools.definitions(&profile.tools);
        let mut messages = vec![Message::user(task)];

        for iteration in 0..self.max_iterations {
            debug!(role = %profile.role, iteration, "Agent loop iteration");

            let response = self
                .llm
                .chat_with_tools(&system_prompt, &messages, &tools, &self.llm.chat_model)
                .await?;

            if response.tool_calls.is_empty() {
                let answer = response.content.unwrap_or_default().trim().to_string();
                if answer.is_empty() {
                    warn!(role = %profile.role, "Agent finished without an answer");
                    return Err(CrewError::EmptyAnswer);
                }
                info!(role = %profile.role, iterations = iteration + 1, "Agent finished");
                return Ok(answer);
            }

            let content = response.content.unwrap_or_default();
            messages.push(Message::assistant_with_tools(
                &content,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let output = self.execute_tool(profile, call).await;
                messages.push(Message::tool(&call.id, &output));
            }
        }

        warn!(role = %profile.role, limit = self.max_iterations, "Agent hit iteration limit");
        Err(CrewError::IterationLimit(self.max_iterations))
    }

    async fn execute_tool(&self, profile: &AgentProfile, call: &ToolCall) -> String {
        let name = call.function.name.as_str();
        if !profile.allows(name) {
            warn!(role = %profile.role, tool = name, "Refusing tool outside the agent's set");
            return format!("Tool '{name}' is not available to the {}", profile.role);
        }

        debug!(tool = name, "Agent calling tool");
        self.tools.execute(name, &call.function.arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::profile::AgentProfile;
    use crate::llm::{MockLlmProvider, ToolDefinition};
    use crate::testing::{client_with, text_response, tool_call_response};
    use crate::tools::{Tool, ToolError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedWeather;

    #[async_trait]
    impl Tool for FixedWeather {
        fn name(&self) -> &'static str {
            "get_weather"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "get_weather".to_string(),
                description: "Weather".to_string(),
                parameters: json!({"type": "object"}),
            }
        }

        fn error_label(&self) -> &'static str {
            "Weather error"
        }

        async fn run(&self, _arguments: &str) -> Result<String, ToolError> {
            Ok("The current weather in Oslo is 3°C with light snow.".to_string())
        }
    }

    fn runner(mock: MockLlmProvider, max_iterations: usize) -> AgentRunner {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(FixedWeather));
        AgentRunner::new(
            Arc::new(client_with(mock)),
            Arc::new(tools),
            max_iterations,
        )
    }

    #[tokio::test]
    async fn test_tool_output_is_fed_back() -> Result<(), CrewError> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_mock = Arc::clone(&seen);
        let mut turn = 0;

        let mut mock = MockLlmProvider::new();
        mock.expect_chat_with_tools()
            .returning(move |_, messages, tools, _, _| {
                turn += 1;
                if let Ok(mut guard) = seen_in_mock.lock() {
                    guard.push((messages.len(), tools.len()));
                }
                if turn == 1 {
                    Ok(tool_call_response("call_1", "get_weather", r#"{"location":"Oslo"}"#))
                } else {
                    Ok(text_response("It is 3°C and snowing in Oslo."))
                }
            });

        let answer = runner(mock, 4)
            .run(&AgentProfile::general(), "weather in Oslo?")
            .await?;

        assert_eq!(answer, "It is 3°C and snowing in Oslo.");
        let calls = seen.lock().map(|g| g.clone()).unwrap_or_default();
        // user, then user + assistant + tool
        assert_eq!(calls, vec![(1, 1), (3, 1)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_outside_profile_is_refused() -> Result<(), CrewError> {
        let replies = Arc::new(Mutex::new(Vec::new()));
        let replies_in_mock = Arc::clone(&replies);
        let mut turn = 0;

        let mut mock = MockLlmProvider::new();
        mock.expect_chat_with_tools()
            .returning(move |_, messages, _, _, _| {
                turn += 1;
                if turn == 1 {
                    return Ok(tool_call_response("call_1", "get_weather", "{}"));
                }
                if let (Ok(mut guard), Some(last)) = (replies_in_mock.lock(), messages.last()) {
                    guard.push(last.content.clone());
                }
                Ok(text_response("I can only manage appointments."))
            });

        runner(mock, 4)
            .run(&AgentProfile::appointment(), "weather?")
            .await?;

        let replies = replies.lock().map(|g| g.clone()).unwrap_or_default();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("not available"));
        Ok(())
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let mut mock = MockLlmProvider::new();
        mock.expect_chat_with_tools()
            .times(3)
            .returning(|_, _, _, _, _| Ok(tool_call_response("call", "get_weather", "{}")));

        let result = runner(mock, 3)
            .run(&AgentProfile::general(), "loop forever")
            .await;

        assert!(matches!(result, Err(CrewError::IterationLimit(3))));
    }

    #[tokio::test]
    async fn test_blank_answer_is_error() {
        let mut mock = MockLlmProvider::new();
        mock.expect_chat_with_tools()
            .returning(|_, _, _, _, _| Ok(text_response("   ")));

        let result = runner(mock, 3).run(&AgentProfile::general(), "hi").await;
        assert!(matches!(result, Err(CrewError::EmptyAnswer)));
    }
}
