//! Capability tools exposed to the agents
//!
//! Each tool implements [`Tool`] and is registered in a [`ToolRegistry`]
//! keyed by its function-calling name. The registry is the only place tool
//! failures are turned into text: [`ToolRegistry::execute`] never fails.

mod appointment;
mod weather;
mod web_search;

pub use appointment::AppointmentTool;
pub use weather::WeatherTool;
pub use web_search::WebSearchTool;

use crate::llm::ToolDefinition;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors a tool can report
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments could not be parsed or were incomplete
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// The external service could not be reached
    #[error("Request failed: {0}")]
    Transport(String),
    /// The external service answered with an error
    #[error("{0}")]
    Api(String),
    /// Persisting state failed
    #[error("{0}")]
    Storage(String),
    /// No tool with this name is registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// A single capability the agents can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function-calling name, unique within a registry
    fn name(&self) -> &'static str;

    /// JSON schema sent to the model
    fn definition(&self) -> ToolDefinition;

    /// Prefix used when rendering a failure as text
    fn error_label(&self) -> &'static str;

    /// Execute the tool with JSON-encoded `arguments`
    async fn run(&self, arguments: &str) -> Result<String, ToolError>;
}

/// Table of available tools keyed by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous one with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(tool = tool.name(), "Registering tool");
        self.tools.insert(tool.name(), tool);
    }

    /// Definitions for the subset of `names` that are registered
    #[must_use]
    pub fn definitions(&self, names: &[&str]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Run a tool and render its outcome as text
    ///
    /// Success text is returned as-is; failures become
    /// `"<error label>: <detail>"`.
    pub async fn execute(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "Model requested an unknown tool");
            return ToolError::UnknownTool(name.to_string()).to_string();
        };

        debug!(tool = name, "Executing tool");
        match tool.run(arguments).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool failed");
                format!("{}: {e}", tool.error_label())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".to_string(),
                description: "Echo".to_string(),
                parameters: json!({"type": "object"}),
            }
        }

        fn error_label(&self) -> &'static str {
            "Echo error"
        }

        async fn run(&self, arguments: &str) -> Result<String, ToolError> {
            if arguments == "fail" {
                return Err(ToolError::Api("boom".to_string()));
            }
            Ok(arguments.to_string())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry
    }

    #[tokio::test]
    async fn test_execute_renders_errors_with_label() {
        let registry = registry();
        assert_eq!(registry.execute("echo", "hi").await, "hi");
        assert_eq!(registry.execute("echo", "fail").await, "Echo error: boom");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_text() {
        assert_eq!(
            registry().execute("nope", "{}").await,
            "Unknown tool: nope"
        );
    }

    #[test]
    fn test_definitions_skip_unregistered_names() {
        let defs = registry().definitions(&["echo", "missing"]);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
    }
}
