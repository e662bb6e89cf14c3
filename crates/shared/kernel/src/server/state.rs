use axum::extract::FromRef;
use sf_domain::config::AppConfig;
use sf_flags::FlagStore;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("State validation error: {message}")]
    Validation { message: Cow<'static, str> },

    #[error("Feature flag setup failed: {source}")]
    Flags {
        #[from]
        source: sf_flags::FlagError,
    },
}

#[derive(Debug)]
pub struct AppStateInner {
    pub config: AppConfig,
    pub flags: FlagStore,
    pub started: Instant,
}

/// Shared request state. Cloning is a reference-count bump.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Builds state straight from configuration, loading the flag registry
    /// from its `flags` section.
    ///
    /// # Errors
    /// Returns [`AppStateError::Flags`] if the registry is invalid.
    pub fn from_config(config: AppConfig) -> Result<Self, AppStateError> {
        let flags = FlagStore::from_config(&config.flags)?;
        Self::builder().config(config).flags(flags).build()
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<AppState> for FlagStore {
    fn from_ref(state: &AppState) -> Self {
        state.inner.flags.clone()
    }
}

#[derive(Debug, Default)]
pub struct AppStateBuilder {
    config: Option<AppConfig>,
    flags: Option<FlagStore>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: FlagStore) -> Self {
        self.flags = Some(flags);
        self
    }

    /// # Errors
    /// Returns [`AppStateError::Validation`] if no configuration was provided.
    pub fn build(self) -> Result<AppState, AppStateError> {
        let config = self.config.ok_or_else(|| AppStateError::Validation {
            message: "AppConfig not provided".into(),
        })?;
        let flags = self.flags.unwrap_or_default();

        Ok(AppState { inner: Arc::new(AppStateInner { config, flags, started: Instant::now() }) })
    }
}
