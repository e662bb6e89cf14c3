//! # School Finder Server
//!
//! HTTP server for feature flag evaluation and administration, built on `Axum`.
//!
//! ## Example
//! ```no_run
//! use sf_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8080)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, ensure};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use sf_kernel::domain::config::{AppConfig, SslConfig};
use sf_kernel::server::AppState;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

/// Collects configuration for a [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Overrides `server.port`; `0` lets the OS pick one.
    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Checks TLS material and loads the flag registry from the `flags` section.
    ///
    /// # Errors
    /// Fails if a configured certificate or key file is missing, or if the
    /// registry is invalid (unknown environment, duplicate keys, rollout above 100).
    pub fn build(self) -> Result<Server> {
        if let Some(ssl) = &self.cfg.server.ssl {
            check_tls_files(ssl)?;
        }

        let state = AppState::from_config(self.cfg).context("Feature flag registry rejected")?;
        Ok(Server { state })
    }
}

fn check_tls_files(ssl: &SslConfig) -> Result<()> {
    ensure!(ssl.cert.exists(), "TLS certificate not found at: {}", ssl.cert.display());
    ensure!(ssl.key.exists(), "TLS private key not found at: {}", ssl.key.display());
    warn_if_key_exposed(&ssl.key)?;
    Ok(())
}

#[cfg(unix)]
fn warn_if_key_exposed(key: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = key.metadata()?.permissions().mode();
    if mode & 0o077 != 0 {
        warn!(
            key = %key.display(),
            mode = format_args!("{mode:o}"),
            "TLS key is readable by group or others"
        );
    }
    Ok(())
}

#[cfg(not(unix))]
fn warn_if_key_exposed(_key: &Path) -> Result<()> {
    Ok(())
}

/// The flags API with its state loaded, ready to bind.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Flag routes, `/health` and the API docs, wrapped in request tracing.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Serves the flags API until SIGINT or SIGTERM, then drains in-flight
    /// requests for up to `server.shutdown_grace_seconds`.
    ///
    /// Plain HTTP unless `server.ssl` is set.
    ///
    /// # Errors
    /// Fails if the address cannot be bound or the TLS files cannot be parsed.
    pub async fn run(self) -> Result<()> {
        let server = &self.state.config.server;
        let address = SocketAddr::new(server.address, server.port);
        let grace = Duration::from_secs(server.shutdown_grace_seconds);
        let flags = self.state.flags.snapshot().len();
        let app = self.router().into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone(), grace));

        match &server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Unreadable TLS certificate or key")?;
                info!(%address, flags, "Serving flags API over HTTPS");
                axum_server::bind_rustls(address, tls)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTPS listener stopped with an error")?;
            }
            None => {
                info!(%address, flags, "Serving flags API over HTTP");
                axum_server::bind(address)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTP listener stopped with an error")?;
            }
        }

        info!("Flags API stopped");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }
}

async fn drain_on_signal(handle: Handle<SocketAddr>, grace: Duration) {
    match shutdown_signal().await {
        Ok(()) => {
            info!(grace_seconds = grace.as_secs(), "Stop requested, draining connections");
            handle.graceful_shutdown(Some(grace));
        }
        Err(e) => warn!("Signal handlers unavailable, stop the process externally: {e:#}"),
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("SIGTERM handler")?;
        tokio::select! {
            res = signal::ctrl_c() => res.context("Ctrl+C handler")?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await.context("Ctrl+C handler")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_loads_default_flags() {
        let server = Server::builder().port(0).build().expect("server builds");
        assert_eq!(server.state().flags.snapshot().len(), 3);
        assert_eq!(server.state().config.server.port, 0);
    }

    #[test]
    fn build_rejects_unknown_flag_environment() {
        let mut cfg = AppConfig::default();
        cfg.flags.environment = "moon".to_owned();
        assert!(Server::builder().config(cfg).build().is_err());
    }

    #[test]
    fn build_rejects_missing_certificates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = AppConfig::default();
        cfg.server.ssl = Some(SslConfig {
            cert: dir.path().join("cert.pem"),
            key: dir.path().join("key.pem"),
        });

        let err = Server::builder().config(cfg).build().expect_err("missing certs");
        assert!(err.to_string().contains("TLS certificate not found"));
    }
}
