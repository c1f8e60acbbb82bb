//! Provider Attempt
//!
//! One bounded-time call against one named model. The call races a timer equal
//! to its budget slot; the loser of the race is dropped, which aborts the
//! in-flight HTTP request and releases its connection before the next attempt
//! begins.

use std::time::Duration;

use tracing::debug;

use super::provider::{CompletionProvider, CompletionRequest};

/// Classified result of one attempt. Exactly one of the three - never
/// partially populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Transport success with a usable completion
    Success(String),
    /// Non-success status or unusable response shape, with the reason
    TransportFailure(String),
    /// The budget slot elapsed before the call returned
    Timeout,
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Execute one attempt against `request.model` within `slot`.
pub async fn run(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
    slot: Duration,
) -> AttemptOutcome {
    debug!(
        provider = provider.name(),
        model = %request.model,
        slot_ms = slot.as_millis() as u64,
        "Attempt"
    );

    match tokio::time::timeout(slot, provider.complete(request)).await {
        Err(_) => AttemptOutcome::Timeout,
        Ok(Err(err)) => AttemptOutcome::TransportFailure(err.to_string()),
        Ok(Ok(reply)) => {
            if reply.content.trim().is_empty() {
                AttemptOutcome::TransportFailure(
                    "invalid response shape: empty completion".to_string(),
                )
            } else {
                AttemptOutcome::Success(reply.content)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::provider::{
        CHAT_VOCABULARY, ProviderReply, RoleVocabulary,
    };
    use crate::types::{PathwiseError, Result};
    use async_trait::async_trait;

    enum Behavior {
        Reply(String),
        Fail(String),
        Hang,
    }

    struct ScriptedProvider {
        behavior: Behavior,
    }

    #[async_trait]
    impl crate::completion::provider::CompletionProvider for ScriptedProvider {
        async fn complete(&self, _request: &CompletionRequest) -> Result<ProviderReply> {
            match &self.behavior {
                Behavior::Reply(content) => Ok(ProviderReply::new(content.clone())),
                Behavior::Fail(reason) => Err(PathwiseError::provider(reason.clone())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(ProviderReply::new("too late"))
                }
            }
        }

        fn vocabulary(&self) -> RoleVocabulary {
            CHAT_VOCABULARY
        }

        fn name(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".to_string(),
            system: None,
            messages: vec![],
            max_tokens: 64,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_success_carries_content() {
        let provider = ScriptedProvider {
            behavior: Behavior::Reply("hello".to_string()),
        };

        let outcome = run(&provider, &request(), Duration::from_secs(1)).await;
        assert_eq!(outcome, AttemptOutcome::Success("hello".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_maps_to_failure() {
        let provider = ScriptedProvider {
            behavior: Behavior::Fail("502 from upstream".to_string()),
        };

        let outcome = run(&provider, &request(), Duration::from_secs(1)).await;
        match outcome {
            AttemptOutcome::TransportFailure(reason) => {
                assert!(reason.contains("502 from upstream"))
            }
            other => panic!("expected transport failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_completion_is_invalid_shape() {
        let provider = ScriptedProvider {
            behavior: Behavior::Reply("   \n".to_string()),
        };

        let outcome = run(&provider, &request(), Duration::from_secs(1)).await;
        match outcome {
            AttemptOutcome::TransportFailure(reason) => {
                assert!(reason.contains("invalid response shape"))
            }
            other => panic!("expected transport failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slot_elapsing_reports_timeout() {
        let provider = ScriptedProvider {
            behavior: Behavior::Hang,
        };

        let outcome = run(&provider, &request(), Duration::from_millis(50)).await;
        assert_eq!(outcome, AttemptOutcome::Timeout);
    }
}
