//! Pathwise - AI Career Mentor Completion Core
//!
//! Obtains the best available structured response under a hard wall-clock
//! budget from a cascade of unreliable completion providers.
//!
//! ## Core Features
//!
//! - **Tiered Cascade**: ordered fallback across provider families, first
//!   success wins, one aggregated failure reason per exhausted tier
//! - **Timeout Budgeting**: per-tier allotments derived from the deployment
//!   profile, guaranteed to fit under the platform's response ceiling
//! - **Bounded Attempts**: every model call races its own budget slot; the
//!   loser is cancelled and its connection released
//! - **Report Detection**: sentinel-delimited structured payloads decoded and
//!   schema-validated by an explicit state machine
//!
//! ## Quick Start
//!
//! ```ignore
//! use pathwise::{Conversation, Message, config::ConfigLoader};
//!
//! let config = ConfigLoader::load()?;
//! let conversation = Conversation::new(vec![Message::requester("Hi!")]);
//! let response = pathwise::completion::respond(&config, &conversation).await?;
//! ```
//!
//! ## Modules
//!
//! - [`completion`]: budget planner, cascade, history adapter, detector,
//!   provider families
//! - [`config`]: layered figment configuration
//! - [`store`]: injected time-bounded storage for one-time codes
//! - [`types`]: conversation, report, and error types

pub mod completion;
pub mod config;
pub mod constants;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, DeploymentProfile, GenerationConfig, TierConfig};

// Error Types
pub use types::error::{PathwiseError, Result, TierFailure};

// Domain Types
pub use types::{CompletionReport, Conversation, CourseSuggestion, Message, NextStep, Role};

// =============================================================================
// Completion Re-exports
// =============================================================================

pub use completion::{
    AttemptOutcome, Budget, Cascade, CascadeOutcome, CascadeStats, ChatResponse,
    CompletionProvider, DetectorOutcome, SharedProvider, Tier, detect, respond,
};

// =============================================================================
// Store Re-exports
// =============================================================================

pub use store::{CodeIssuer, ExpiringStore};
