//! Stats command implementation.

use anyhow::{Context, Result};
use ipnet::IpNet;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::aggregator::{collapse, count_ipv4};
use crate::config::Config;
use crate::entry::{parse_entries, DenyEntry};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::store::load_denylist;
use crate::utils::{format_count, format_coverage, format_file_size, group_digits};

/// Composition of a denylist document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DenylistStats {
    pub ipv4_hosts: usize,
    pub ipv6_hosts: usize,
    pub ipv4_networks: usize,
    pub ipv6_networks: usize,
    pub malformed: usize,
    /// Distinct IPv4 addresses covered, overlaps counted once
    pub covered_ipv4: u64,
}

impl DenylistStats {
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Self {
        let parsed = parse_entries(raw);

        let nets: Vec<IpNet> = parsed
            .hosts
            .iter()
            .map(|ip| IpNet::from(*ip))
            .chain(parsed.networks.iter().copied())
            .collect();
        let disjoint: Vec<DenyEntry> = collapse(&nets, 0)
            .into_iter()
            .map(DenyEntry::Network)
            .collect();

        Self {
            ipv4_hosts: parsed.hosts.iter().filter(|ip| ip.is_ipv4()).count(),
            ipv6_hosts: parsed.hosts.iter().filter(|ip| ip.is_ipv6()).count(),
            ipv4_networks: parsed
                .networks
                .iter()
                .filter(|n| matches!(n, IpNet::V4(_)))
                .count(),
            ipv6_networks: parsed
                .networks
                .iter()
                .filter(|n| matches!(n, IpNet::V6(_)))
                .count(),
            malformed: parsed.dropped.len(),
            covered_ipv4: count_ipv4(&disjoint),
        }
    }

    pub fn total_entries(&self) -> usize {
        self.ipv4_hosts + self.ipv6_hosts + self.ipv4_networks + self.ipv6_networks
    }
}

/// Run the stats command
pub fn run(input: Option<PathBuf>, json: bool, config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    let input = input.unwrap_or(config.denylist_path);

    if json {
        let raw = load_denylist(real_fs(), &input);
        println!("{}", serde_json::to_string_pretty(&DenylistStats::from_raw(&raw))?);
    } else {
        display_stats(real_fs(), &input);
    }
    Ok(())
}

/// Display formatted statistics for the denylist at `path`
pub fn display_stats(fs: &dyn FileSystem, path: &Path) {
    let raw = load_denylist(fs, path);
    let stats = DenylistStats::from_raw(&raw);
    let size = fs.metadata(path).map(|m| m.len()).ok();

    println!();
    println!("══════════════════════════════════════════════════════════════════");
    println!(" DENYLIST STATISTICS");
    println!("══════════════════════════════════════════════════════════════════");
    println!();
    println!(" File: {}", path.display());
    match size {
        Some(bytes) => println!(" Size: {}", format_file_size(bytes)),
        None => println!(" Size: (unreadable)"),
    }
    println!();
    println!(" KIND                IPv4         IPv6");
    println!(" ────────────────── ──────────── ────────────");
    println!(
        " {:<18} {:>12} {:>12}",
        "Hosts",
        format_count(stats.ipv4_hosts as u64),
        format_count(stats.ipv6_hosts as u64)
    );
    println!(
        " {:<18} {:>12} {:>12}",
        "Networks",
        format_count(stats.ipv4_networks as u64),
        format_count(stats.ipv6_networks as u64)
    );
    println!(" ────────────────── ──────────── ────────────");
    println!(
        " Total entries: {} ({} malformed)",
        group_digits(stats.total_entries() as u64),
        stats.malformed
    );
    println!();

    if stats.covered_ipv4 > 0 {
        println!(" Coverage: {}", format_coverage(stats.covered_ipv4));
        println!();
    }

    println!("══════════════════════════════════════════════════════════════════");
    println!();
}
