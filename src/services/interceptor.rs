//! Per-query capability interception.
//!
//! Installed once during the process-load callback and consulted on every
//! capability query for the remaining lifetime of the process. The resolved
//! flag sets are computed on the first query and frozen; a preference change
//! only takes effect after the hooked application restarts.

use crate::metrics::Metrics;
use crate::models::SpoofSettings;
use crate::services::resolver::{FeatureFlagResolver, ResolvedFeatureState};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Outcome of the decision procedure for one capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDecision {
    /// Short-circuit the query to `true`
    Grant,
    /// Short-circuit the query to `false`
    Deny,
    /// Let the original implementation answer
    PassThrough,
}

/// Decides capability-query answers from the resolved flag sets.
///
/// Queries may arrive concurrently from any thread of the hooked
/// application; the lazy resolution below uses [`OnceCell`] so the sets are
/// computed exactly once and steady-state reads stay lock-free.
pub struct CapabilityQueryInterceptor {
    settings: SpoofSettings,
    resolver: FeatureFlagResolver,
    resolved: OnceCell<ResolvedFeatureState>,
    metrics: Arc<Metrics>,
}

impl CapabilityQueryInterceptor {
    pub fn new(
        settings: SpoofSettings,
        resolver: FeatureFlagResolver,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            settings,
            resolver,
            resolved: OnceCell::new(),
            metrics,
        }
    }

    /// The resolved flag sets, computed on first access.
    pub fn resolved(&self) -> &ResolvedFeatureState {
        self.resolved
            .get_or_init(|| self.resolver.resolve(&self.settings))
    }

    /// Decision procedure for one query.
    ///
    /// 1. Granted flag: answer `true`.
    /// 2. ROM override enabled and the flag is a known-but-unselected one:
    ///    answer `false`.
    /// 3. Otherwise leave the query to the original implementation.
    ///
    /// Step 2 is opt-in because forcing `false` is a stronger override than
    /// adding missing flags; it exists for OS builds that natively report
    /// high-tier capability flags regardless of device identity.
    pub fn decide(&self, feature_name: &str) -> QueryDecision {
        let resolved = self.resolved();

        let decision = if resolved.granted.contains(feature_name) {
            self.metrics.record_query_granted();
            QueryDecision::Grant
        } else if self.settings.override_rom_feature_levels && resolved.denied.contains(feature_name)
        {
            self.metrics.record_query_denied();
            QueryDecision::Deny
        } else {
            self.metrics.record_query_passed_through();
            QueryDecision::PassThrough
        };

        if self.settings.verbose_logs {
            tracing::debug!("Capability query {} -> {:?}", feature_name, decision);
        }

        decision
    }

    /// Short-circuit answer for a query, `None` meaning "defer".
    ///
    /// The `flags` argument mirrors the second call-signature variant of the
    /// hooked query method; it never affects the decision.
    pub fn intercept_query(&self, feature_name: &str, _flags: Option<i32>) -> Option<bool> {
        match self.decide(feature_name) {
            QueryDecision::Grant => Some(true),
            QueryDecision::Deny => Some(false),
            QueryDecision::PassThrough => None,
        }
    }
}
