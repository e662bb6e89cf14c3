use anyhow::Context;
use sf_kernel::config::ConfigLoader;
use sf_kernel::domain::config::AppConfig;
use sf_logger::Logger;
use sf_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "server".to_owned());
    let cfg: AppConfig = ConfigLoader::new(&path)
        .required(false)
        .load()
        .context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build()?.run().await
}
