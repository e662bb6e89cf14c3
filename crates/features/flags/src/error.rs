use std::borrow::Cow;

/// Errors raised while building or updating a feature registry.
///
/// Evaluation itself never fails; these only surface from configuration paths.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("Feature flag '{key}' not found")]
    NotFound { key: String },

    #[error("Feature flag '{key}' is defined more than once")]
    DuplicateKey { key: String },

    #[error("Invalid rollout percentage for '{key}': {value} (expected 0..=100)")]
    InvalidRollout { key: String, value: u8 },

    #[error("Invalid feature key: {message}")]
    InvalidKey { message: Cow<'static, str> },

    #[error("Unknown environment '{name}'")]
    InvalidEnvironment { name: String },
}

pub type Result<T> = std::result::Result<T, FlagError>;
