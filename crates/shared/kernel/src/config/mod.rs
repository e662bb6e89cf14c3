use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix for environment overrides (`SF__SERVER__PORT` maps to `server.port`).
pub const ENV_PREFIX: &str = "SF";
const ENV_SEPARATOR: &str = "__";

/// Custom error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error ({context}): {source}")]
    Config { source: config::ConfigError, context: &'static str },
}

/// Layered configuration loader: a base file overlaid with environment variables.
///
/// 1. **Base File**: `path` with or without extension (`server` finds `server.toml`).
/// 2. **Environment Overrides**: variables prefixed with `SF__`; nested keys are
///    separated by double underscores (`SF__FLAGS__ENVIRONMENT=production`).
#[must_use = "loaders do nothing unless you call .load()"]
#[derive(Debug)]
pub struct ConfigLoader {
    path: PathBuf,
    required: bool,
    env_overrides: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
            env_overrides: None,
        }
    }

    /// Whether a missing base file is an error. Defaults to `true`.
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Reads overrides from `vars` instead of the process environment.
    pub fn env_overrides<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_overrides = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Builds the layered configuration and deserializes it into `T`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] if a required file is missing, a source
    /// cannot be parsed, or the merged values do not match `T`.
    pub fn load<T>(self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .convert_case(config::Case::Snake)
            .source(self.env_overrides);

        info!("Loading config from {}", self.path.display());

        Config::builder()
            .add_source(File::from(self.path.as_path()).required(self.required))
            .add_source(environment)
            .build()
            .map_err(|source| ConfigError::Config { source, context: "Failed to build config" })?
            .try_deserialize::<T>()
            .map_err(|source| ConfigError::Config {
                source,
                context: "Failed to deserialize config",
            })
    }
}

/// Loads `T` from `path` (default `server`) plus `SF__` environment overrides.
///
/// # Errors
/// See [`ConfigLoader::load`]. The file is required.
///
/// # Example
/// ```rust
/// use sf_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let loader = path.map_or_else(|| ConfigLoader::new("server"), |p| ConfigLoader::new(p));
    loader.load()
}
