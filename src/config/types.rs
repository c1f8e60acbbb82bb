//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/pathwise/) and project (.pathwise/) level
//! configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{codes as code_constants, generation as gen_constants};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Deployment profile governing timeout budgets
    pub profile: DeploymentProfile,

    /// Generation parameter settings
    pub generation: GenerationConfig,

    /// Completion tiers in priority order
    pub tiers: Vec<TierConfig>,

    /// One-time-code settings
    pub codes: CodesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            profile: DeploymentProfile::default(),
            generation: GenerationConfig::default(),
            tiers: TierConfig::default_tiers(),
            codes: CodesConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PathwiseError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(crate::types::PathwiseError::config(format!(
                "Generation temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.generation.max_tokens == 0 {
            return Err(crate::types::PathwiseError::config(
                "Generation max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.tiers.is_empty() {
            return Err(crate::types::PathwiseError::config(
                "At least one completion tier must be configured".to_string(),
            ));
        }

        for tier in &self.tiers {
            if tier.models.is_empty() {
                return Err(crate::types::PathwiseError::config(format!(
                    "Tier '{}' has no models configured",
                    tier.name
                )));
            }
        }

        if self.codes.ttl_secs == 0 {
            return Err(crate::types::PathwiseError::config(
                "Code ttl_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Deployment Profile
// =============================================================================

/// Deployment profile determining per-tier timeout budgets.
///
/// An enumerated, injected configuration value: the budget planner branches on
/// this, never on ambient environment inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentProfile {
    /// Platform imposes a hard total-response ceiling; budgets divide it
    #[default]
    Constrained,
    /// No external ceiling; each tier gets a generous independent allotment
    Unconstrained,
}

impl std::fmt::Display for DeploymentProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentProfile::Constrained => write!(f, "constrained"),
            DeploymentProfile::Unconstrained => write!(f, "unconstrained"),
        }
    }
}

impl std::str::FromStr for DeploymentProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constrained" => Ok(DeploymentProfile::Constrained),
            "unconstrained" => Ok(DeploymentProfile::Unconstrained),
            _ => Err(format!(
                "Unknown deployment profile: {}. Valid values: constrained, unconstrained",
                s
            )),
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

/// Generation parameters shared by every provider.
///
/// Recognized options only: output length and sampling temperature. No
/// free-form provider-specific tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: gen_constants::DEFAULT_MAX_TOKENS,
            temperature: gen_constants::DEFAULT_TEMPERATURE,
        }
    }
}

// =============================================================================
// Tier Configuration
// =============================================================================

/// One completion tier: a provider and its ordered candidate models.
///
/// Tiers are immutable per deployment and totally ordered by their position in
/// `Config::tiers`.
///
/// Note: API keys are handled securely - they are never serialized to output
/// and are redacted in debug output. Each provider converts the key to
/// SecretString internally for runtime protection.
#[derive(Clone, Serialize, Deserialize)]
pub struct TierConfig {
    /// Tier name for diagnostics ("primary", "secondary", "final")
    pub name: String,
    /// Provider family: "openai", "anthropic", "ollama"
    pub provider: String,
    /// Models tried in declared order within the tier
    pub models: Vec<String>,
    /// API key (for OpenAI, Anthropic)
    /// Never serialized to output for security
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
}

impl std::fmt::Debug for TierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierConfig")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("models", &self.models)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TierConfig {
    /// Default three-tier cascade: hosted primary, hosted secondary, local final
    pub fn default_tiers() -> Vec<Self> {
        vec![
            Self {
                name: "primary".to_string(),
                provider: "openai".to_string(),
                models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
                api_key: None,
                api_base: None,
            },
            Self {
                name: "secondary".to_string(),
                provider: "anthropic".to_string(),
                models: vec![
                    "claude-sonnet-4-20250514".to_string(),
                    "claude-3-5-haiku-20241022".to_string(),
                ],
                api_key: None,
                api_base: None,
            },
            Self {
                name: "final".to_string(),
                provider: "ollama".to_string(),
                models: vec!["llama3:latest".to_string()],
                api_key: None,
                api_base: None,
            },
        ]
    }
}

// =============================================================================
// Codes Configuration
// =============================================================================

/// One-time-code store settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CodesConfig {
    /// Seconds a code stays valid
    pub ttl_secs: u64,
}

impl Default for CodesConfig {
    fn default() -> Self {
        Self {
            ttl_secs: code_constants::CODE_TTL_SECS,
        }
    }
}
