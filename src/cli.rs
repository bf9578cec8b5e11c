//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "denylist-optimizer")]
#[command(author, version, about = "Compacts an IP denylist into minimal CIDR blocks")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output, lists every promoted member)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Promote, collapse and atomically rewrite the denylist
    Optimize {
        /// Denylist to read (default: denylist_path from config)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Denylist to write (default: same as input)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Compute and print the result without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show entry counts and address coverage of a denylist
    Stats {
        /// Denylist to inspect (default: denylist_path from config)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show version
    Version,
}
