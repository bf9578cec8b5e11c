//! denylist-optimizer - compacts an IP denylist into minimal CIDR blocks.
//!
//! Meant to be run periodically by a scheduler (cron, systemd timer).

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use denylist_optimizer::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // Logs go to stderr so stdout stays parseable (stats --json, dry runs)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Optimize {
            input,
            output,
            dry_run,
        } => denylist_optimizer::commands::optimize::run(input, output, dry_run, &cli.config),
        Commands::Stats { input, json } => {
            denylist_optimizer::commands::stats::run(input, json, &cli.config)
        }
        Commands::Version => {
            println!("denylist-optimizer {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
