//! Immutable feature registry.

use crate::bucket;
use crate::error::{FlagError, Result};
use fxhash::FxHashMap;
use sf_domain::config::FlagsConfig;
use sf_domain::features::{
    FeatureDefinition, FeatureKey, FeatureUpdate, RegistryMetadata, default_definitions,
};

/// Read-only mapping from feature key to its definition.
///
/// A registry is validated once when built and never mutated afterwards.
/// Updates produce a new registry via [`FeatureRegistry::with_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRegistry {
    features: FxHashMap<FeatureKey, FeatureDefinition>,
    metadata: RegistryMetadata,
}

impl FeatureRegistry {
    #[must_use]
    pub fn builder() -> FeatureRegistryBuilder {
        FeatureRegistryBuilder::default()
    }

    /// Builds a registry from the `flags` configuration section.
    ///
    /// # Errors
    /// Returns any validation error raised by [`FeatureRegistryBuilder::build`].
    pub fn from_config(config: &FlagsConfig) -> Result<Self> {
        Self::builder()
            .metadata(config.metadata.clone())
            .features(config.features.iter().cloned())
            .build()
    }

    /// Looks up a definition. Unknown keys are absent, not an error.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FeatureDefinition> {
        self.features.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    /// Decides whether `flag` is on for `user_id` using only the master switch
    /// and the rollout percentage. Unknown flags are off.
    ///
    /// # Example
    /// ```rust
    /// use sf_domain::features::FeatureDefinition;
    /// use sf_flags::FeatureRegistry;
    ///
    /// let registry = FeatureRegistry::builder()
    ///     .feature(FeatureDefinition::new("x", "X").enabled(true).rollout(50))
    ///     .build()?;
    ///
    /// assert!(!registry.is_enabled("x", Some("user-42")));
    /// assert!(!registry.is_enabled("does-not-exist", Some("user-42")));
    /// # Ok::<(), sf_flags::FlagError>(())
    /// ```
    #[must_use]
    pub fn is_enabled(&self, flag: &str, user_id: Option<&str>) -> bool {
        self.get(flag).is_some_and(|feature| {
            feature.enabled && bucket::in_rollout(user_id, feature.rollout_percentage)
        })
    }

    /// Definitions sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureDefinition> {
        let mut features: Vec<_> = self.features.values().collect();
        features.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        features.into_iter()
    }

    /// Keys sorted lexicographically.
    #[must_use]
    pub fn keys(&self) -> Vec<&FeatureKey> {
        let mut keys: Vec<_> = self.features.keys().collect();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub const fn metadata(&self) -> &RegistryMetadata {
        &self.metadata
    }

    /// Returns a copy of this registry with `update` applied to `key`.
    ///
    /// # Errors
    /// * [`FlagError::NotFound`] if `key` is not registered.
    /// * [`FlagError::InvalidRollout`] if the new percentage exceeds 100.
    pub fn with_update(&self, key: &str, update: &FeatureUpdate) -> Result<Self> {
        let current =
            self.features.get(key).ok_or_else(|| FlagError::NotFound { key: key.to_owned() })?;

        let mut next = current.clone();
        if let Some(display_name) = &update.display_name {
            next.display_name.clone_from(display_name);
        }
        if let Some(description) = &update.description {
            next.description.clone_from(description);
        }
        if let Some(enabled) = update.enabled {
            next.enabled = enabled;
        }
        if let Some(percentage) = update.rollout_percentage {
            next.rollout_percentage = percentage;
        }
        if let Some(roles) = &update.allowed_roles {
            next.allowed_roles.clone_from(roles);
        }
        if let Some(environments) = update.environments {
            next.environments = environments;
        }
        validate(&next)?;

        let mut registry = self.clone();
        registry.features.insert(next.key.clone(), next);
        Ok(registry)
    }
}

impl Default for FeatureRegistry {
    /// The built-in flags, all disabled.
    fn default() -> Self {
        Self {
            features: default_definitions().into_iter().map(|f| (f.key.clone(), f)).collect(),
            metadata: RegistryMetadata::default(),
        }
    }
}

/// Collects definitions and validates them into a [`FeatureRegistry`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct FeatureRegistryBuilder {
    definitions: Vec<FeatureDefinition>,
    metadata: Option<RegistryMetadata>,
}

impl FeatureRegistryBuilder {
    pub fn feature(mut self, definition: FeatureDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn features<I>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = FeatureDefinition>,
    {
        self.definitions.extend(definitions);
        self
    }

    pub fn metadata(mut self, metadata: RegistryMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Validates every definition and freezes the registry.
    ///
    /// # Errors
    /// * [`FlagError::InvalidKey`] for an empty or blank key.
    /// * [`FlagError::InvalidRollout`] for a percentage above 100.
    /// * [`FlagError::DuplicateKey`] when two definitions share a key.
    pub fn build(self) -> Result<FeatureRegistry> {
        let mut features =
            FxHashMap::with_capacity_and_hasher(self.definitions.len(), Default::default());

        for definition in self.definitions {
            validate(&definition)?;
            if features.contains_key(&definition.key) {
                return Err(FlagError::DuplicateKey { key: definition.key.to_string() });
            }
            features.insert(definition.key.clone(), definition);
        }

        Ok(FeatureRegistry { features, metadata: self.metadata.unwrap_or_default() })
    }
}

fn validate(definition: &FeatureDefinition) -> Result<()> {
    let key = definition.key.as_str();
    if key.trim().is_empty() {
        return Err(FlagError::InvalidKey { message: "key cannot be empty".into() });
    }
    if key.trim() != key {
        return Err(FlagError::InvalidKey {
            message: format!("key '{key}' has surrounding whitespace").into(),
        });
    }
    if u32::from(definition.rollout_percentage) > bucket::BUCKETS {
        return Err(FlagError::InvalidRollout {
            key: key.to_owned(),
            value: definition.rollout_percentage,
        });
    }
    Ok(())
}
