//! # Feature Flags
//!
//! Registry of togglable features and the deterministic bucketing that decides
//! who sees them.
//!
//! * [`FeatureRegistry`] is an immutable, validated map from key to definition.
//! * [`is_feature_enabled`] applies the master switch and rollout percentage.
//!   The same user id always lands in the same bucket (see [`bucket`]), so
//!   rollout membership is stable across sessions and processes.
//! * [`Evaluator`] adds environment and role targeting on top.
//! * [`FlagStore`] publishes new registry snapshots when administrators change
//!   a definition at runtime.
//!
//! ## Example
//! ```rust
//! use sf_domain::features::{EnvironmentSet, FeatureDefinition};
//! use sf_flags::{EvaluationContext, FeatureRegistry, FlagStore};
//!
//! let registry = FeatureRegistry::builder()
//!     .feature(FeatureDefinition::new("x", "X").enabled(true).rollout(60))
//!     .build()?;
//! let store = FlagStore::new(registry, EnvironmentSet::PRODUCTION);
//!
//! // "user-42" sits in bucket 57.
//! let ctx = EvaluationContext::user("user-42");
//! assert!(store.evaluator().is_enabled("x", &ctx));
//! assert!(!store.evaluator().is_enabled("x", &EvaluationContext::anonymous()));
//! # Ok::<(), sf_flags::FlagError>(())
//! ```

pub mod bucket;
mod error;
mod evaluator;
mod registry;
mod store;

pub use crate::error::{FlagError, Result};
pub use crate::evaluator::{EvaluationContext, Evaluator, is_feature_enabled};
pub use crate::registry::{FeatureRegistry, FeatureRegistryBuilder};
pub use crate::store::FlagStore;
