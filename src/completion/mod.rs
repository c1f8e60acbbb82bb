//! Completion Orchestration Layer
//!
//! Everything between a caller's conversation and the best available
//! structured response: budget planning, the provider cascade, history
//! adaptation, and structured-report detection.

pub mod attempt;
pub mod budget;
pub mod cascade;
pub mod detector;
pub mod history;
pub mod prompt;
pub mod provider;

pub use attempt::AttemptOutcome;
pub use budget::Budget;
pub use cascade::{AttemptRecord, Cascade, CascadeOutcome, CascadeStats, Tier};
pub use detector::{DetectorOutcome, detect};
pub use history::{AdaptedConversation, adapt};
pub use provider::{
    AnthropicProvider, CompletionProvider, CompletionRequest, OllamaProvider, OpenAiProvider,
    ProviderReply, RoleVocabulary, SharedProvider, WireMessage, create_provider,
};

use crate::config::Config;
use crate::types::{Conversation, Result};

/// One full request: adapt, cascade, detect.
///
/// Returns either an ongoing conversational reply or the conversation's
/// terminal completion report, along with which provider produced it.
pub async fn respond(config: &Config, conversation: &Conversation) -> Result<ChatResponse> {
    let budget = Budget::plan(config.profile, config.tiers.len())?;
    let cascade = Cascade::from_config(config)?;
    let outcome = cascade.run(conversation, &budget).await?;
    let detected = detect(&outcome.content)?;

    Ok(ChatResponse {
        outcome: detected,
        provider_used: outcome.provider_used,
        model_used: outcome.model_used,
    })
}

/// Final response for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub outcome: DetectorOutcome,
    pub provider_used: String,
    pub model_used: String,
}
