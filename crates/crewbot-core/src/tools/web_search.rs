//! Web search via SerpApi (Google engine)

use super::{Tool, ToolError};
use crate::config::get_tool_http_timeout_secs;
use crate::llm::{create_http_client, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Tool returning the top organic search result for a query
pub struct WebSearchTool {
    client: HttpClient,
    api_base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
}

impl WebSearchTool {
    /// Create the tool for `api_base` (e.g. `https://serpapi.com`)
    #[must_use]
    pub fn new(api_key: Option<String>, api_base: &str) -> Self {
        Self {
            client: create_http_client(get_tool_http_timeout_secs()),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

fn field<'a>(result: &'a Value, key: &str, fallback: &'a str) -> &'a str {
    result.get(key).and_then(Value::as_str).unwrap_or(fallback)
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Search the web for the given query and return the top result"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn error_label(&self) -> &'static str {
        "Web search error"
    }

    async fn run(&self, arguments: &str) -> Result<String, ToolError> {
        let args: WebSearchArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::Api("SERPAPI_KEY is not configured".to_string()))?;

        info!(query = %args.query, "Executing web search");

        let response = self
            .client
            .get(format!("{}/search.json", self.api_base))
            .query(&[
                ("engine", "google"),
                ("q", args.query.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, "Search API response received");

        let results: Value = match serde_json::from_str(&body) {
            Ok(results) => results,
            Err(e) if status.is_success() => {
                warn!(error = %e, "Search API returned an unreadable body");
                return Err(ToolError::Api(format!("Unexpected search response: {e}")));
            }
            Err(_) => Value::Null,
        };

        if let Some(error) = results.get("error") {
            let message = error.as_str().map_or_else(|| error.to_string(), ToString::to_string);
            warn!(error = %message, "Search API error");
            return Err(ToolError::Api(message));
        }
        if !status.is_success() {
            return Err(ToolError::Api(format!("Search service returned {status}")));
        }

        let Some(first) = results
            .get("organic_results")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
        else {
            warn!(query = %args.query, "No search results found");
            return Ok("No results found.".to_string());
        };

        Ok(format!(
            "{}\n{}\n{}",
            field(first, "title", "No title"),
            field(first, "snippet", "No description"),
            field(first, "link", "No link")
        ))
    }
}
