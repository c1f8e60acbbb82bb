//! Anthropic API Provider
//!
//! Completion provider using Anthropic's Messages API. System instructions
//! travel in the top-level `system` field, and completions come back as a
//! list of content blocks.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    CHAT_VOCABULARY, CompletionProvider, CompletionRequest, ProviderReply, RoleVocabulary,
};
use crate::config::TierConfig;
use crate::constants::network as net_constants;
use crate::types::{PathwiseError, Result};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API Provider with secure API key handling
pub struct AnthropicProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: &TierConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                PathwiseError::config(
                    "Anthropic API key not found. Set ANTHROPIC_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(net_constants::CLIENT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(net_constants::CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PathwiseError::provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            client,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> MessagesRequest {
        MessagesRequest {
            model: request.model.clone(),
            system: request.system.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role,
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<ProviderReply> {
        debug!(model = %request.model, "Sending request to Anthropic API");

        let body = self.build_request(request);
        let url = format!("{}/v1/messages", self.api_base);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PathwiseError::provider(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PathwiseError::provider(format!(
                "Anthropic API error ({}): {}",
                status, body
            )));
        }

        let response_body: MessagesResponse = response.json().await.map_err(|e| {
            PathwiseError::provider(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let content = response_body
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| {
                PathwiseError::provider(
                    "invalid response shape: no text block in Anthropic response",
                )
            })?;

        Ok(ProviderReply::new(content))
    }

    fn vocabulary(&self) -> RoleVocabulary {
        CHAT_VOCABULARY
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/v1/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!("Anthropic API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Anthropic API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::provider::WireMessage;

    fn tier_with_key() -> TierConfig {
        TierConfig {
            name: "secondary".to_string(),
            provider: "anthropic".to_string(),
            models: vec!["claude-sonnet-4-20250514".to_string()],
            api_key: Some("sk-ant-test".to_string()),
            api_base: None,
        }
    }

    #[test]
    fn test_build_request_keeps_system_out_of_messages() {
        let provider = AnthropicProvider::new(&tier_with_key()).unwrap();
        let request = CompletionRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            system: Some("You are a mentor.".to_string()),
            messages: vec![
                WireMessage::new("user", "Hello"),
                WireMessage::new("assistant", "Hi!"),
            ],
            max_tokens: 512,
            temperature: 0.7,
        };

        let body = provider.build_request(&request);
        assert_eq!(body.system.as_deref(), Some("You are a mentor."));
        assert_eq!(body.messages.len(), 2);
        assert!(body.messages.iter().all(|m| m.role != "system"));
    }

    #[test]
    fn test_content_block_deserializes_text() {
        let json = r#"{"content": [{"type": "text", "text": "hello"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.content.len(), 1);
    }
}
