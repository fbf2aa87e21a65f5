//! Completion Client Abstraction
//!
//! Provides a generic interface for sending one system + user prompt pair to a
//! hosted completion service and getting raw text back. The real client talks
//! to the Anthropic Messages API; the fake client is scripted for tests.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Messages API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Longest slice of an error body kept in `CompletionError::Http`
const MAX_ERROR_BODY: usize = 512;

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Output token ceiling sent with every request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whole-request timeout for the HTTP client
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Usually supplied through `ANTHROPIC_API_KEY` rather than the file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            api_key: None,
        }
    }
}

/// One completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user_message: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Completion errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion service API key is not configured")]
    MissingApiKey,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("completion service rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("completion service rate limit exceeded")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("completion service returned no text")]
    EmptyResponse,
}

/// Completion service seam
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt pair and return the model's raw text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

// ============================================================================
// Anthropic Messages API
// ============================================================================

/// Real client for the Anthropic Messages API
pub struct AnthropicClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.endpoint.trim_end_matches('/'))
    }

    fn map_send_error(&self, e: reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Timeout(self.config.timeout_secs)
        } else {
            CompletionError::Http(format!("Request failed: {}", e))
        }
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CompletionError::MissingApiKey)?;

        let body = serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "system": request.system,
            "messages": [
                {"role": "user", "content": request.user_message},
            ],
        });

        debug!(
            "Sending completion request to {} (model {}, {} bytes)",
            self.messages_url(),
            request.model,
            request.user_message.len()
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CompletionError::Unauthorized(status.as_u16()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(CompletionError::Http(format!(
                "HTTP {} from completion service: {}",
                status, snippet
            )));
        }

        let json: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.config.timeout_secs)
            } else {
                CompletionError::InvalidResponse(format!("Failed to parse response: {}", e))
            }
        })?;

        extract_message_text(&json)
    }
}

/// Concatenate the `text` blocks of a Messages API response
pub fn extract_message_text(response: &Value) -> Result<String, CompletionError> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| CompletionError::InvalidResponse("missing content array".to_string()))?;

    let text: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    Ok(text)
}

// ============================================================================
// Fake client (tests)
// ============================================================================

/// Scripted completion client for testing
pub struct FakeCompletionClient {
    responses: Mutex<Vec<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletionClient {
    /// Create a fake client with pre-defined responses
    pub fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a fake client that always returns this text
    pub fn always_text(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    /// Create a fake client that always returns an error
    pub fn always_error(error: CompletionError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Most recent request seen, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

#[async_trait]
impl CompletionClient for FakeCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| CompletionError::EmptyResponse)?;

        match responses.len() {
            0 => Err(CompletionError::EmptyResponse),
            // Keep returning the last response
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            user_message: "user".to_string(),
            model: "test-model".to_string(),
            max_tokens: 10,
        }
    }

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.endpoint, "https://api.anthropic.com");
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_extract_message_text_joins_text_blocks() {
        let response = serde_json::json!({
            "content": [
                {"type": "text", "text": "{\"a\":"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "1}"}
            ]
        });
        assert_eq!(extract_message_text(&response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_message_text_errors() {
        let missing = serde_json::json!({"id": "msg_1"});
        assert!(matches!(
            extract_message_text(&missing),
            Err(CompletionError::InvalidResponse(_))
        ));

        let empty = serde_json::json!({"content": []});
        assert_eq!(extract_message_text(&empty), Err(CompletionError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = AnthropicClient::new(LlmConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();

        let result = client.complete(&request()).await;
        assert_eq!(result, Err(CompletionError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_fake_client_always_text() {
        let client = FakeCompletionClient::always_text("hello");

        assert_eq!(client.complete(&request()).await.unwrap(), "hello");
        assert_eq!(client.complete(&request()).await.unwrap(), "hello");
        assert_eq!(client.call_count(), 2);
        assert_eq!(client.last_request().unwrap().model, "test-model");
    }

    #[tokio::test]
    async fn test_fake_client_multiple_responses() {
        let client = FakeCompletionClient::new(vec![
            Ok("one".to_string()),
            Err(CompletionError::RateLimited),
        ]);

        assert_eq!(client.complete(&request()).await.unwrap(), "one");
        assert_eq!(
            client.complete(&request()).await,
            Err(CompletionError::RateLimited)
        );
        assert_eq!(client.call_count(), 2);
    }
}
