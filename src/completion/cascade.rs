//! Cascade Orchestrator
//!
//! Ordered fallback across heterogeneous completion providers. Tiers are tried
//! strictly in priority order and models within a tier in declared order; the
//! first success wins. Tiers are never raced in parallel: cost and rate-limit
//! exposure scale with the number of simultaneously in-flight calls, so the
//! only race anywhere is one attempt against its own timer.
//!
//! A failed attempt is never retried at the same model; the only "retry" is
//! advancement to the next model or tier.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::attempt::{self, AttemptOutcome};
use super::budget::Budget;
use super::history;
use super::prompt;
use super::provider::{CompletionRequest, SharedProvider, create_provider};
use crate::config::{Config, GenerationConfig};
use crate::types::{Conversation, PathwiseError, Result, TierFailure};

/// One provider and its ordered list of candidate models. Immutable per
/// deployment; tried only after all higher-priority tiers are exhausted.
#[derive(Clone)]
pub struct Tier {
    /// Tier name for diagnostics
    pub name: String,
    /// Provider instance serving every model in the tier
    pub provider: SharedProvider,
    /// Models tried in declared order
    pub models: Vec<String>,
}

impl Tier {
    pub fn new(name: impl Into<String>, provider: SharedProvider, models: Vec<String>) -> Self {
        Self {
            name: name.into(),
            provider,
            models,
        }
    }
}

/// Result of a successful cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// The winning completion text
    pub content: String,
    /// Provider that produced it
    pub provider_used: String,
    /// Model that produced it
    pub model_used: String,
    /// One aggregated reason per tier exhausted before success, priority order
    pub fallback_reasons: Vec<TierFailure>,
}

/// Record of one attempt inside a cascade run
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub tier: String,
    pub model: String,
    pub success: bool,
    /// Failure detail, absent on success
    pub detail: Option<String>,
    pub duration: Duration,
}

/// Execution statistics for one cascade run
#[derive(Debug, Default)]
pub struct CascadeStats {
    pub total_attempts: usize,
    pub attempts: Vec<AttemptRecord>,
    pub total_duration: Duration,
}

impl CascadeStats {
    fn record(&mut self, tier: &Tier, model: &str, outcome: &AttemptOutcome, duration: Duration) {
        self.total_attempts += 1;
        let (success, detail) = match outcome {
            AttemptOutcome::Success(_) => (true, None),
            AttemptOutcome::TransportFailure(reason) => (false, Some(reason.clone())),
            AttemptOutcome::Timeout => (false, Some("timed out".to_string())),
        };
        self.attempts.push(AttemptRecord {
            tier: tier.name.clone(),
            model: model.to_string(),
            success,
            detail,
            duration,
        });
    }
}

/// The full ordered tier/model fallback sequence for one request
pub struct Cascade {
    tiers: Vec<Tier>,
    generation: GenerationConfig,
    system_prompt: Option<String>,
}

impl Cascade {
    pub fn new(tiers: Vec<Tier>, generation: GenerationConfig) -> Self {
        Self {
            tiers,
            generation,
            system_prompt: Some(prompt::mentor_system_prompt()),
        }
    }

    /// Override the system instructions (tests, alternate personas)
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    /// Build the cascade from configuration, instantiating one provider per
    /// tier. Fails fast on a missing credential: no request should be
    /// attempted against a misconfigured deployment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut tiers = Vec::with_capacity(config.tiers.len());
        for tier_config in &config.tiers {
            let provider = create_provider(tier_config)?;
            tiers.push(Tier::new(
                tier_config.name.clone(),
                provider,
                tier_config.models.clone(),
            ));
        }
        Ok(Self::new(tiers, config.generation))
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Run the cascade and return only the outcome
    pub async fn run(&self, conversation: &Conversation, budget: &Budget) -> Result<CascadeOutcome> {
        let (outcome, _stats) = self.execute(conversation, budget).await?;
        Ok(outcome)
    }

    /// Run the cascade, returning the outcome and per-attempt statistics
    #[instrument(
        skip_all,
        fields(request_id = %Uuid::new_v4(), tiers = self.tiers.len())
    )]
    pub async fn execute(
        &self,
        conversation: &Conversation,
        budget: &Budget,
    ) -> Result<(CascadeOutcome, CascadeStats)> {
        if self.tiers.is_empty() {
            return Err(PathwiseError::config(
                "No completion tiers configured".to_string(),
            ));
        }
        if budget.tier_count() < self.tiers.len() {
            return Err(PathwiseError::config(format!(
                "Budget covers {} tiers but {} are configured",
                budget.tier_count(),
                self.tiers.len()
            )));
        }

        let started = Instant::now();
        let mut stats = CascadeStats::default();
        let mut fallbacks: Vec<TierFailure> = Vec::new();

        for (tier_index, tier) in self.tiers.iter().enumerate() {
            // slot presence verified against tier_count above
            let Some(slot) = budget.slot(tier_index) else {
                continue;
            };

            let adapted = history::adapt(conversation, &tier.provider.vocabulary())?;
            let messages = adapted.into_wire_messages(&tier.provider.vocabulary());

            let mut model_reasons: Vec<String> = Vec::new();

            for model in &tier.models {
                if let Some(ceiling) = budget.ceiling()
                    && started.elapsed() >= ceiling
                {
                    warn!(
                        tier = %tier.name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Platform ceiling exhausted, failing fast"
                    );
                    fallbacks.push(TierFailure::new(
                        tier.name.clone(),
                        "platform ceiling exhausted before attempt",
                    ));
                    stats.total_duration = started.elapsed();
                    return Err(PathwiseError::CascadeExhausted { reasons: fallbacks });
                }

                let request = CompletionRequest {
                    model: model.clone(),
                    system: self.system_prompt.clone(),
                    messages: messages.clone(),
                    max_tokens: self.generation.max_tokens,
                    temperature: self.generation.temperature,
                };

                let attempt_started = Instant::now();
                let outcome = attempt::run(tier.provider.as_ref(), &request, slot).await;
                stats.record(tier, model, &outcome, attempt_started.elapsed());

                match outcome {
                    AttemptOutcome::Success(content) => {
                        stats.total_duration = started.elapsed();
                        info!(
                            provider = tier.provider.name(),
                            model = %model,
                            attempts = stats.total_attempts,
                            "Cascade succeeded"
                        );
                        return Ok((
                            CascadeOutcome {
                                content,
                                provider_used: tier.provider.name().to_string(),
                                model_used: model.clone(),
                                fallback_reasons: fallbacks,
                            },
                            stats,
                        ));
                    }
                    AttemptOutcome::TransportFailure(reason) => {
                        warn!(
                            tier = %tier.name,
                            model = %model,
                            reason = %reason,
                            "Attempt failed"
                        );
                        model_reasons.push(format!("{}: {}", model, reason));
                    }
                    AttemptOutcome::Timeout => {
                        warn!(
                            tier = %tier.name,
                            model = %model,
                            slot_ms = slot.as_millis() as u64,
                            "Attempt timed out"
                        );
                        model_reasons.push(format!("{}: timed out after {:?}", model, slot));
                    }
                }
            }

            debug!(tier = %tier.name, "Tier exhausted");
            fallbacks.push(TierFailure::new(
                tier.name.clone(),
                format!("all models exhausted ({})", model_reasons.join("; ")),
            ));
        }

        stats.total_duration = started.elapsed();
        Err(PathwiseError::CascadeExhausted { reasons: fallbacks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::provider::{
        CHAT_VOCABULARY, CompletionProvider, ProviderReply, RoleVocabulary,
    };
    use crate::types::Message;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy)]
    enum Script {
        Succeed,
        Fail,
        Hang,
        /// Fail on the first model, succeed on later ones
        FailThenSucceed,
    }

    struct MockProvider {
        name: String,
        script: Script,
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl MockProvider {
        fn shared(
            name: &str,
            script: Script,
            calls: &Arc<Mutex<Vec<(String, String)>>>,
        ) -> SharedProvider {
            Arc::new(Self {
                name: name.to_string(),
                script,
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for MockProvider {
        async fn complete(&self, request: &CompletionRequest) -> Result<ProviderReply> {
            let call_index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((self.name.clone(), request.model.clone()));
                calls.iter().filter(|(name, _)| *name == self.name).count()
            };

            match self.script {
                Script::Succeed => Ok(ProviderReply::new(format!("reply from {}", self.name))),
                Script::Fail => Err(PathwiseError::provider("503 service unavailable")),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(ProviderReply::new("too late"))
                }
                Script::FailThenSucceed => {
                    if call_index == 1 {
                        Err(PathwiseError::provider("503 service unavailable"))
                    } else {
                        Ok(ProviderReply::new(format!("reply from {}", self.name)))
                    }
                }
            }
        }

        fn vocabulary(&self) -> RoleVocabulary {
            CHAT_VOCABULARY
        }

        fn name(&self) -> &str {
            &self.name
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn conversation() -> Conversation {
        Conversation::new(vec![
            Message::responder("What brings you here?"),
            Message::requester("I want to change careers."),
        ])
    }

    fn generation() -> GenerationConfig {
        GenerationConfig::default()
    }

    fn open_budget(tiers: usize) -> Budget {
        Budget::from_slots(vec![Duration::from_millis(200); tiers], None).unwrap()
    }

    #[tokio::test]
    async fn test_first_tier_success_skips_lower_tiers() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cascade = Cascade::new(
            vec![
                Tier::new(
                    "primary",
                    MockProvider::shared("alpha", Script::Succeed, &calls),
                    vec!["a1".to_string(), "a2".to_string()],
                ),
                Tier::new(
                    "secondary",
                    MockProvider::shared("beta", Script::Succeed, &calls),
                    vec!["b1".to_string()],
                ),
            ],
            generation(),
        );

        let (outcome, stats) = cascade
            .execute(&conversation(), &open_budget(2))
            .await
            .unwrap();

        assert_eq!(outcome.provider_used, "alpha");
        assert_eq!(outcome.model_used, "a1");
        assert!(outcome.fallback_reasons.is_empty());
        assert_eq!(stats.total_attempts, 1);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![("alpha".to_string(), "a1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_timeouts_advance_to_next_tier_in_declared_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cascade = Cascade::new(
            vec![
                Tier::new(
                    "primary",
                    MockProvider::shared("alpha", Script::Hang, &calls),
                    vec!["a1".to_string(), "a2".to_string()],
                ),
                Tier::new(
                    "secondary",
                    MockProvider::shared("beta", Script::FailThenSucceed, &calls),
                    vec!["b1".to_string(), "b2".to_string()],
                ),
            ],
            generation(),
        );
        let budget = Budget::from_slots(
            vec![Duration::from_millis(30), Duration::from_millis(500)],
            None,
        )
        .unwrap();

        let (outcome, _stats) = cascade.execute(&conversation(), &budget).await.unwrap();

        assert_eq!(outcome.provider_used, "beta");
        assert_eq!(outcome.model_used, "b2");
        // Every tier-1 model timed out; tier 2 was tried in declared order,
        // each model exactly once
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                ("alpha".to_string(), "a1".to_string()),
                ("alpha".to_string(), "a2".to_string()),
                ("beta".to_string(), "b1".to_string()),
                ("beta".to_string(), "b2".to_string()),
            ]
        );
        assert_eq!(outcome.fallback_reasons.len(), 1);
        assert_eq!(outcome.fallback_reasons[0].tier, "primary");
        assert!(outcome.fallback_reasons[0].reason.contains("timed out"));
    }

    #[tokio::test]
    async fn test_exhaustion_aggregates_one_reason_per_tier_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cascade = Cascade::new(
            vec![
                Tier::new(
                    "primary",
                    MockProvider::shared("alpha", Script::Fail, &calls),
                    vec!["a1".to_string(), "a2".to_string()],
                ),
                Tier::new(
                    "secondary",
                    MockProvider::shared("beta", Script::Fail, &calls),
                    vec!["b1".to_string()],
                ),
                Tier::new(
                    "final",
                    MockProvider::shared("gamma", Script::Fail, &calls),
                    vec!["c1".to_string()],
                ),
            ],
            generation(),
        );

        let err = cascade
            .execute(&conversation(), &open_budget(3))
            .await
            .unwrap_err();

        match err {
            PathwiseError::CascadeExhausted { reasons } => {
                assert_eq!(reasons.len(), 3);
                assert_eq!(reasons[0].tier, "primary");
                assert_eq!(reasons[1].tier, "secondary");
                assert_eq!(reasons[2].tier, "final");
                assert!(reasons[0].reason.contains("all models exhausted"));
                assert!(reasons[0].reason.contains("503 service unavailable"));
            }
            other => panic!("expected CascadeExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ceiling_exhaustion_fails_fast() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cascade = Cascade::new(
            vec![
                Tier::new(
                    "primary",
                    MockProvider::shared("alpha", Script::Hang, &calls),
                    vec!["a1".to_string(), "a2".to_string()],
                ),
                Tier::new(
                    "secondary",
                    MockProvider::shared("beta", Script::Succeed, &calls),
                    vec!["b1".to_string()],
                ),
            ],
            generation(),
        );
        // Two hanging 60ms attempts walk past the 100ms ceiling before the
        // second tier is reached
        let budget = Budget::from_slots(
            vec![Duration::from_millis(60), Duration::from_millis(30)],
            Some(Duration::from_millis(100)),
        )
        .unwrap();

        let err = cascade.execute(&conversation(), &budget).await.unwrap_err();

        match err {
            PathwiseError::CascadeExhausted { reasons } => {
                assert_eq!(reasons[0].tier, "primary");
                assert!(reasons.last().unwrap().reason.contains("ceiling"));
            }
            other => panic!("expected CascadeExhausted, got {:?}", other),
        }
        // The healthy second tier was never attempted
        assert!(
            calls
                .lock()
                .unwrap()
                .iter()
                .all(|(provider, _)| provider == "alpha")
        );
    }

    #[tokio::test]
    async fn test_empty_tier_list_is_a_config_error() {
        let cascade = Cascade::new(vec![], generation());
        let err = cascade
            .execute(&conversation(), &open_budget(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PathwiseError::Config(_)));
    }

    #[tokio::test]
    async fn test_budget_must_cover_every_tier() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cascade = Cascade::new(
            vec![
                Tier::new(
                    "primary",
                    MockProvider::shared("alpha", Script::Succeed, &calls),
                    vec!["a1".to_string()],
                ),
                Tier::new(
                    "secondary",
                    MockProvider::shared("beta", Script::Succeed, &calls),
                    vec!["b1".to_string()],
                ),
            ],
            generation(),
        );

        let err = cascade
            .execute(&conversation(), &open_budget(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PathwiseError::Config(_)));
        assert!(calls.lock().unwrap().is_empty());
    }
}
