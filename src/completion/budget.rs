//! Timeout Budget Planner
//!
//! Derives per-tier timeout allotments from the deployment profile so the sum
//! of worst-case tier durations stays under the platform's hard response
//! ceiling. Allotments are static per profile - no dynamic adjustment based on
//! observed latency.

use std::time::Duration;

use crate::config::DeploymentProfile;
use crate::constants::budget as budget_constants;
use crate::types::{PathwiseError, Result};

/// Per-tier timeout allotments for one request.
///
/// Indexed by tier position. In the constrained profile the allotments divide
/// the platform ceiling; in the unconstrained profile each tier gets an
/// independent generous slot and there is no ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    per_tier: Vec<Duration>,
    ceiling: Option<Duration>,
}

impl Budget {
    /// Plan a budget for `tier_count` tiers under the given profile.
    ///
    /// Constrained: the ceiling minus a safety margin is divided evenly across
    /// tiers. Adding a tier re-divides; if the division would drop a slot
    /// below the minimum usable size this fails loudly instead of silently
    /// exceeding or degrading.
    pub fn plan(profile: DeploymentProfile, tier_count: usize) -> Result<Self> {
        if tier_count == 0 {
            return Err(PathwiseError::config(
                "Cannot plan a budget for zero tiers".to_string(),
            ));
        }

        match profile {
            DeploymentProfile::Constrained => {
                let ceiling = Duration::from_millis(budget_constants::PLATFORM_CEILING_MS);
                let usable_ms = (budget_constants::PLATFORM_CEILING_MS as f64
                    * (1.0 - budget_constants::CEILING_MARGIN)) as u64;
                let slot_ms = usable_ms / tier_count as u64;

                if slot_ms < budget_constants::MIN_TIER_SLOT_MS {
                    return Err(PathwiseError::config(format!(
                        "{} tiers cannot fit under the {}ms platform ceiling: \
                         per-tier slot {}ms is below the {}ms minimum",
                        tier_count,
                        budget_constants::PLATFORM_CEILING_MS,
                        slot_ms,
                        budget_constants::MIN_TIER_SLOT_MS
                    )));
                }

                Ok(Self {
                    per_tier: vec![Duration::from_millis(slot_ms); tier_count],
                    ceiling: Some(ceiling),
                })
            }
            DeploymentProfile::Unconstrained => Ok(Self {
                per_tier: vec![
                    Duration::from_millis(budget_constants::UNCONSTRAINED_TIER_MS);
                    tier_count
                ],
                ceiling: None,
            }),
        }
    }

    /// Build a budget from explicit slots.
    ///
    /// With a ceiling, the slots must sum strictly below it.
    pub fn from_slots(per_tier: Vec<Duration>, ceiling: Option<Duration>) -> Result<Self> {
        if per_tier.is_empty() {
            return Err(PathwiseError::config(
                "Budget must cover at least one tier".to_string(),
            ));
        }

        if let Some(ceiling) = ceiling {
            let total: Duration = per_tier.iter().sum();
            if total >= ceiling {
                return Err(PathwiseError::config(format!(
                    "Tier slots sum to {:?}, at or above the {:?} ceiling",
                    total, ceiling
                )));
            }
        }

        Ok(Self { per_tier, ceiling })
    }

    /// Allotment for the tier at `index`, if the budget covers it
    pub fn slot(&self, index: usize) -> Option<Duration> {
        self.per_tier.get(index).copied()
    }

    /// Number of tiers this budget covers
    pub fn tier_count(&self) -> usize {
        self.per_tier.len()
    }

    /// The platform ceiling, when the profile imposes one
    pub fn ceiling(&self) -> Option<Duration> {
        self.ceiling
    }

    /// Sum of all per-tier allotments
    pub fn total_allotted(&self) -> Duration {
        self.per_tier.iter().sum()
    }
}
