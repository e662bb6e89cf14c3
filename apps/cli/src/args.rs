//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect and evaluate School Finder feature flags")]
pub(crate) struct Cli {
    /// Log debug output from the flag engine
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Decide whether a flag is on for a user
    Eval {
        /// Feature key (e.g. 'newSearchExperience')
        flag: String,

        /// Stable user identifier; omit to evaluate as an anonymous caller
        #[arg(short, long)]
        user: Option<String>,

        /// Caller role checked against the flag's allowed roles
        #[arg(short, long)]
        role: Option<String>,

        /// Config file holding a `flags` section (built-in flags when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the rollout hash and bucket for one or more user ids
    Bucket {
        #[arg(required = true)]
        users: Vec<String>,
    },
    /// List every flag in the registry
    List {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Load a config file and validate its flag registry
    Validate {
        path: PathBuf,
    },
}
