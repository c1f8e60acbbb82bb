//! Completion Provider Abstraction
//!
//! Defines the CompletionProvider trait: one polymorphic `complete` capability
//! implemented per provider family, iterated by the single generic cascade
//! routine. Providers never enforce the attempt deadline themselves; the
//! attempt layer races every call against its budget slot.
//!
//! ## Modules
//!
//! - `openai`: OpenAI Chat Completions API
//! - `anthropic`: Anthropic Messages API
//! - `ollama`: locally-running Ollama models (final fallback tier)

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::TierConfig;
use crate::types::{PathwiseError, Result, Role};

// =============================================================================
// Role Vocabulary
// =============================================================================

/// The role tags a provider family understands.
///
/// The history adapter remaps our neutral `Role` into these before a
/// conversation crosses the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleVocabulary {
    pub requester: &'static str,
    pub responder: &'static str,
}

impl RoleVocabulary {
    pub const fn new(requester: &'static str, responder: &'static str) -> Self {
        Self {
            requester,
            responder,
        }
    }

    /// Tag for one of our neutral roles
    pub fn tag(&self, role: Role) -> &'static str {
        match role {
            Role::Requester => self.requester,
            Role::Responder => self.responder,
        }
    }
}

/// The chat-style vocabulary shared by all current provider families
pub const CHAT_VOCABULARY: RoleVocabulary = RoleVocabulary::new("user", "assistant");

// =============================================================================
// Wire Types
// =============================================================================

/// One message in a provider's vocabulary, ready to cross the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One completion call: adapted messages, a model identifier, and the
/// recognized generation parameters (output length and temperature only).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier within the provider
    pub model: String,
    /// System instructions, kept out of the message sequence
    pub system: Option<String>,
    /// Adapted conversation, current turn included as the final entry
    pub messages: Vec<WireMessage>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// Success payload of one provider call: a single text completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub content: String,
}

impl ProviderReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Shared provider handle iterated by the cascade
pub type SharedProvider = Arc<dyn CompletionProvider>;

// =============================================================================
// Completion Provider Trait
// =============================================================================

/// One provider family's completion capability.
///
/// `complete` issues the transport call and returns either one text
/// completion or an error; deadlines, outcome classification, and fallback
/// all live above this trait.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue one completion call
    async fn complete(&self, request: &CompletionRequest) -> Result<ProviderReply>;

    /// Role vocabulary this family understands
    fn vocabulary(&self) -> RoleVocabulary;

    /// Provider name for logging and diagnostics
    fn name(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from a tier's configuration
pub fn create_provider(config: &TierConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        _ => Err(PathwiseError::config(format!(
            "Unknown provider: {}. Supported: openai, anthropic, ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_tags() {
        assert_eq!(CHAT_VOCABULARY.tag(Role::Requester), "user");
        assert_eq!(CHAT_VOCABULARY.tag(Role::Responder), "assistant");
    }

    #[test]
    fn test_create_provider_rejects_unknown_family() {
        let config = TierConfig {
            name: "primary".to_string(),
            provider: "aol".to_string(),
            models: vec!["m".to_string()],
            api_key: None,
            api_base: None,
        };

        assert!(create_provider(&config).is_err());
    }
}
