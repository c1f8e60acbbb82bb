//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Taxonomy
//!
//! - **Config**: a required credential or tier is unusable at startup; fatal,
//!   no request is attempted
//! - **Provider**: transport-level failure from one model call; absorbed by
//!   the cascade, never surfaced individually
//! - **Timeout**: one operation exceeded its deadline; absorbed the same way
//! - **CascadeExhausted**: every tier failed; terminal, carries one aggregated
//!   reason per tier in priority order
//! - **MalformedReport**: a transport-successful completion whose embedded
//!   report could not be decoded or validated; terminal, distinct from
//!   transport failure
//!
//! ## Design Principles
//!
//! - Single unified error type (PathwiseError) for the entire application
//! - Structured error variants with context for better debugging
//! - No panic/unwrap - all errors are recoverable

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Tier Failure
// =============================================================================

/// One exhausted tier's aggregated failure reason.
///
/// Ordered by tier priority inside `CascadeExhausted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierFailure {
    /// Tier name as configured ("primary", "secondary", ...)
    pub tier: String,
    /// Aggregated reason covering every model in the tier
    pub reason: String,
}

impl TierFailure {
    pub fn new(tier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for TierFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.tier, self.reason)
    }
}

/// Join tier failures for diagnostics, priority order preserved
fn join_failures(failures: &[TierFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PathwiseError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Startup Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Completion Errors
    // -------------------------------------------------------------------------
    /// Transport-level failure from one provider call. Recovered locally by
    /// advancing to the next model or tier; never reaches the caller.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Operation exceeded its deadline
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Caller handed a conversation the adapter cannot work with
    #[error("Invalid conversation: {0}")]
    Conversation(String),

    /// Every tier failed; reasons listed in tier priority order
    #[error("All completion tiers exhausted: {}", join_failures(.reasons))]
    CascadeExhausted { reasons: Vec<TierFailure> },

    /// Transport succeeded but the embedded report violated its contract
    #[error("Malformed completion report: {reason}")]
    MalformedReport { reason: String },
}

impl PathwiseError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a provider transport error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a malformed-report error
    pub fn malformed_report(reason: impl Into<String>) -> Self {
        Self::MalformedReport {
            reason: reason.into(),
        }
    }

    /// Whether this error ends the request with no recovery path.
    ///
    /// Transport-level failures are absorbed inside the cascade; only the
    /// aggregated or content-level variants are terminal for the caller.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::CascadeExhausted { .. } | Self::MalformedReport { .. } | Self::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PathwiseError>;

// =============================================================================
// Tests
// =============================================================================
