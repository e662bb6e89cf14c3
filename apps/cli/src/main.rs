#![allow(clippy::print_stdout, clippy::print_stderr)]

mod args;
mod commands;

use crate::args::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use sf_logger::{LevelFilter, Logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::ERROR };
    let _log = Logger::builder(env!("CARGO_PKG_NAME")).level(level).init()?;

    match cli.command {
        Commands::Eval { flag, user, role, config } => {
            commands::eval(&flag, user.as_deref(), role.as_deref(), config.as_deref())?;
        },
        Commands::Bucket { users } => commands::bucket(&users),
        Commands::List { config, json } => commands::list(config.as_deref(), json)?,
        Commands::Validate { path } => commands::validate(&path)?,
    }

    Ok(())
}
