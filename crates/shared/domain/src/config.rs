use crate::constants::DEVELOPMENT;
use crate::features::{FeatureDefinition, RegistryMetadata, default_definitions};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub flags: FlagsConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_grace_seconds: u64,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Log output settings. `RUST_LOG` still overrides `level` when `filter` is unset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console: bool,
    pub level: String,
    pub filter: Option<String>,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

/// Feature flag registry source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// Deployment environment used for environment-targeted flags.
    pub environment: String,
    pub metadata: RegistryMetadata,
    pub features: Vec<FeatureDefinition>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            ssl: None,
            shutdown_grace_seconds: 30,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console: true,
            level: "info".to_owned(),
            filter: None,
            directory: None,
            json: false,
            max_files: 10,
        }
    }
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            environment: DEVELOPMENT.to_owned(),
            metadata: RegistryMetadata::default(),
            features: default_definitions(),
        }
    }
}
