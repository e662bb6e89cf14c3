//! Kernel utilities shared across apps.
//! Keep this crate lightweight: configuration loading, and behind the `server`
//! feature, the application state and HTTP routes for feature flags.
//!
//! ## Config loading
//! ```rust,no_run
//! use sf_kernel::config::ConfigLoader;
//! use sf_kernel::domain::config::AppConfig;
//!
//! let cfg: AppConfig = ConfigLoader::new("server").required(false).load()?;
//! # Ok::<(), sf_kernel::config::ConfigError>(())
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use sf_domain as domain;
pub use sf_flags as flags;
