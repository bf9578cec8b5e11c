//! Optimize command implementation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::lock::LockGuard;
use crate::optimizer::{Optimizer, RunSummary};
use crate::store::{load_denylist, save_atomic};
use crate::utils::format_count;

/// Run the optimize command
pub fn run(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
    config_path: &Path,
) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let input = input.unwrap_or_else(|| config.denylist_path.clone());
    let output = output.unwrap_or_else(|| input.clone());

    let summary = execute(real_fs(), &config, &input, &output, dry_run)?;

    println!();
    if dry_run {
        println!("[DRY RUN] {}", summary);
    } else {
        println!(
            "[OK] {} entries written to {} ({} IPv4 addresses covered)",
            summary.output_entries,
            output.display(),
            format_count(summary.covered_ipv4)
        );
    }

    Ok(())
}

/// Load, optimize and (unless `dry_run`) persist one denylist.
pub fn execute(
    fs: &dyn FileSystem,
    config: &Config,
    input: &Path,
    output: &Path,
    dry_run: bool,
) -> Result<RunSummary> {
    info!("Starting denylist optimization of {:?}", input);

    let _lock = if dry_run {
        None
    } else {
        let lock = LockGuard::acquire(output)?;
        debug!("Holding writer lock {:?}", lock.path());
        Some(lock)
    };

    let raw = load_denylist(fs, input);
    let optimized = Optimizer::new(config).optimize(&raw)?;

    if dry_run {
        for entry in &optimized.entries {
            println!("{}", entry);
        }
        info!("Dry run: {:?} left untouched", output);
        return Ok(optimized.summary);
    }

    save_atomic(fs, output, &optimized.entries)
        .with_context(|| format!("Failed to write denylist {:?}", output))?;

    Ok(optimized.summary)
}
