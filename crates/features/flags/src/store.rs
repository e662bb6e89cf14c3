//! Swappable registry snapshots for runtime administration.

use crate::error::{FlagError, Result};
use crate::evaluator::Evaluator;
use crate::registry::FeatureRegistry;
use parking_lot::RwLock;
use sf_domain::config::FlagsConfig;
use sf_domain::features::{EnvironmentSet, FeatureDefinition, FeatureUpdate};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
struct FlagStoreInner {
    current: RwLock<Arc<FeatureRegistry>>,
    environment: EnvironmentSet,
}

/// Holds the live registry. Cheap to clone; clones share the same snapshot.
///
/// Readers take an `Arc` to the current snapshot and evaluate without any lock
/// held. Writers are serialized and publish a whole new registry, so a reader
/// sees either the old or the new definition, never a mix.
#[derive(Debug, Clone)]
pub struct FlagStore {
    inner: Arc<FlagStoreInner>,
}

impl FlagStore {
    pub fn new(registry: FeatureRegistry, environment: EnvironmentSet) -> Self {
        Self {
            inner: Arc::new(FlagStoreInner {
                current: RwLock::new(Arc::new(registry)),
                environment,
            }),
        }
    }

    /// Builds the registry and resolves the deployment environment from config.
    ///
    /// # Errors
    /// * [`FlagError::InvalidEnvironment`] if `environment` names no known environment.
    /// * Any registry validation error.
    pub fn from_config(config: &FlagsConfig) -> Result<Self> {
        let environment = EnvironmentSet::from(config.environment.as_str());
        if environment.is_empty() {
            return Err(FlagError::InvalidEnvironment { name: config.environment.clone() });
        }

        let registry = FeatureRegistry::from_config(config)?;
        info!(
            flags = registry.len(),
            environment = %config.environment,
            version = %registry.metadata().version,
            "Feature flag registry loaded"
        );

        Ok(Self::new(registry, environment))
    }

    /// The registry as of now.
    #[must_use]
    pub fn snapshot(&self) -> Arc<FeatureRegistry> {
        Arc::clone(&*self.inner.current.read())
    }

    /// An evaluator bound to the current snapshot.
    #[must_use]
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.snapshot(), self.inner.environment)
    }

    #[must_use]
    pub fn environment(&self) -> EnvironmentSet {
        self.inner.environment
    }

    /// Applies a partial update and publishes the resulting registry.
    ///
    /// Returns the updated definition.
    ///
    /// # Errors
    /// Propagates [`FeatureRegistry::with_update`] errors; the live registry is
    /// left untouched on failure.
    pub fn update(&self, key: &str, update: &FeatureUpdate) -> Result<FeatureDefinition> {
        let mut current = self.inner.current.write();
        let next = current.with_update(key, update)?;
        let definition =
            next.get(key).cloned().ok_or_else(|| FlagError::NotFound { key: key.to_owned() })?;
        *current = Arc::new(next);
        drop(current);

        info!(
            flag = key,
            enabled = definition.enabled,
            rollout = definition.rollout_percentage,
            "Feature flag updated"
        );
        Ok(definition)
    }

}

impl Default for FlagStore {
    fn default() -> Self {
        Self::new(FeatureRegistry::default(), EnvironmentSet::DEVELOPMENT)
    }
}
