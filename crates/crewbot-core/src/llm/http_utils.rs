//! HTTP utilities for LLM providers and capability tools
//!
//! Provides common HTTP request/response handling shared by the
//! OpenAI-compatible provider and the tools that call REST services.

use crate::config::get_llm_http_timeout_secs;
use crate::llm::LlmError;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;

/// Creates an HTTP client configured with the given request timeout.
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Creates an HTTP client configured with the standard LLM timeout.
///
/// Uses `LLM_HTTP_TIMEOUT_SECS` environment variable or the default.
pub(crate) fn create_llm_http_client() -> HttpClient {
    create_http_client(get_llm_http_timeout_secs())
}

/// Sends an HTTP POST request with JSON body and returns parsed JSON response.
///
/// # Errors
///
/// Returns `LlmError::NetworkError` on connectivity issues, `LlmError::ApiError` on non-success status codes,
/// or `LlmError::JsonError` if parsing fails.
pub(crate) async fn send_json_request(
    client: &HttpClient,
    url: &str,
    body: &Value,
    auth_header: Option<&str>,
) -> Result<Value, LlmError> {
    let mut request = client.post(url).json(body);

    if let Some(auth) = auth_header {
        request = request.header("Authorization", auth);
    }

    let response = request
        .send()
        .await
        .map_err(|e| LlmError::NetworkError(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError(clean_error_body(status, &error_text)));
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::JsonError(e.to_string()))
}

/// Turn an error body into a short message, hiding proxy HTML pages.
fn clean_error_body(status: reqwest::StatusCode, error_text: &str) -> String {
    let trimmed = error_text.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return format!("API error: {status} (Server returned HTML error page)");
    }

    let truncated = if error_text.chars().count() > 500 {
        format!("{}... (truncated)", crate::utils::truncate_str(error_text, 500))
    } else {
        error_text.to_string()
    };
    format!("API error: {status} - {truncated}")
}
