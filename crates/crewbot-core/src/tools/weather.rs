//! Current weather lookup via OpenWeather

use super::{Tool, ToolError};
use crate::config::get_tool_http_timeout_secs;
use crate::llm::{create_http_client, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Tool returning the current weather for a location
pub struct WeatherTool {
    client: HttpClient,
    api_base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    name: String,
    main: MainReadings,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    // Kept as a JSON number so whole degrees print without a fraction
    temp: Value,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

impl WeatherTool {
    /// Create the tool for `api_base` (e.g. `https://api.openweathermap.org`)
    #[must_use]
    pub fn new(api_key: Option<String>, api_base: &str) -> Self {
        Self {
            client: create_http_client(get_tool_http_timeout_secs()),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Get current weather for a location".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The location to get weather for"
                    }
                },
                "required": ["location"]
            }),
        }
    }

    fn error_label(&self) -> &'static str {
        "Weather error"
    }

    async fn run(&self, arguments: &str) -> Result<String, ToolError> {
        let args: WeatherArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::Api("OPENWEATHER_API_KEY is not configured".to_string()))?;

        info!(location = %args.location, "Fetching weather");

        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.api_base))
            .query(&[
                ("q", args.location.as_str()),
                ("appid", api_key),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or_default();
        debug!(status = %status, "Weather API response received");

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            warn!(status = %status, detail = message, "Weather API error");
            return Err(ToolError::Api(format!(
                "Could not fetch weather for '{}': {message}",
                args.location
            )));
        }

        let data: WeatherResponse = serde_json::from_value(body)
            .map_err(|e| ToolError::Api(format!("Unexpected weather response: {e}")))?;
        let description = data
            .weather
            .first()
            .map_or("unknown conditions", |c| c.description.as_str());

        Ok(format!(
            "The current weather in {} is {}°C with {description}.",
            data.name, data.main.temp
        ))
    }
}
