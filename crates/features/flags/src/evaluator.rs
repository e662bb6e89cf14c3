//! Targeted evaluation: environment and role gates on top of rollout bucketing.

use crate::bucket;
use crate::registry::FeatureRegistry;
use sf_domain::features::{EnvironmentSet, FeatureDefinition, FeatureKey};
use std::sync::Arc;
use tracing::warn;

/// Decides whether `flag` is on for `user_id`.
///
/// Fails closed: an unknown flag, a disabled flag, or a partial rollout
/// without a usable identifier all yield `false`. Pure and side-effect free.
#[must_use]
pub fn is_feature_enabled(registry: &FeatureRegistry, flag: &str, user_id: Option<&str>) -> bool {
    registry.is_enabled(flag, user_id)
}

/// Who is asking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationContext<'a> {
    pub user_id: Option<&'a str>,
    pub role: Option<&'a str>,
}

impl<'a> EvaluationContext<'a> {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user_id: None, role: None }
    }

    #[must_use]
    pub const fn user(user_id: &'a str) -> Self {
        Self { user_id: Some(user_id), role: None }
    }

    #[must_use]
    pub const fn role(mut self, role: &'a str) -> Self {
        self.role = Some(role);
        self
    }
}

/// Evaluates flags for one deployment environment against a registry snapshot.
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<FeatureRegistry>,
    environment: EnvironmentSet,
}

impl Evaluator {
    pub fn new(registry: impl Into<Arc<FeatureRegistry>>, environment: EnvironmentSet) -> Self {
        Self { registry: registry.into(), environment }
    }

    #[must_use]
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn environment(&self) -> EnvironmentSet {
        self.environment
    }

    /// Full targeting check for a single flag.
    ///
    /// Order: master switch, environment, role, then rollout percentage.
    /// A role is only checked when the caller supplies one.
    #[must_use]
    pub fn is_enabled(&self, flag: &str, ctx: &EvaluationContext<'_>) -> bool {
        let Some(feature) = self.registry.get(flag) else {
            warn!(flag, "Feature flag not found");
            return false;
        };
        self.evaluate(feature, ctx)
    }

    /// Every flag that is on for `ctx`, sorted by key.
    #[must_use]
    pub fn enabled_features(&self, ctx: &EvaluationContext<'_>) -> Vec<FeatureKey> {
        self.registry
            .iter()
            .filter(|feature| self.evaluate(feature, ctx))
            .map(|feature| feature.key.clone())
            .collect()
    }

    fn evaluate(&self, feature: &FeatureDefinition, ctx: &EvaluationContext<'_>) -> bool {
        if !feature.enabled {
            return false;
        }

        if !feature.environments.is_empty() && !feature.environments.intersects(self.environment) {
            return false;
        }

        if let Some(role) = ctx.role
            && !feature.allowed_roles.is_empty()
            && !feature.allowed_roles.iter().any(|allowed| allowed == role)
        {
            return false;
        }

        bucket::in_rollout(ctx.user_id, feature.rollout_percentage)
    }
}
