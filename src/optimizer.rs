//! The optimization pipeline: parse, promote, collapse, filter.
//!
//! ```text
//! raw strings -> parse_entries -> promote (/24, /16, /8) -> compact -> sorted entries
//! ```
//!
//! Persistence is left to the caller (see [`crate::store::save_atomic`]) so
//! that a dry run and a real run share the exact same computation.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::aggregator::{compact, count_ipv4};
use crate::config::Config;
use crate::entry::{parse_entries, DenyEntry};
use crate::error::DenylistError;
use crate::promotion::{promote, PromotionPolicy};

/// Counters describing one optimization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub input_entries: usize,
    pub parsed_hosts: usize,
    pub parsed_networks: usize,
    pub dropped: usize,
    pub promoted_24: usize,
    pub promoted_16: usize,
    pub promoted_8: usize,
    pub refused_by_floor: usize,
    pub output_entries: usize,
    pub covered_ipv4: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries in ({} hosts, {} subnets, {} dropped) -> {} entries out \
             (promoted: {} /24, {} /16, {} /8; refused by floor: {})",
            self.input_entries,
            self.parsed_hosts,
            self.parsed_networks,
            self.dropped,
            self.output_entries,
            self.promoted_24,
            self.promoted_16,
            self.promoted_8,
            self.refused_by_floor
        )
    }
}

/// Output of [`Optimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    pub entries: Vec<DenyEntry>,
    pub summary: RunSummary,
}

/// Runs the pipeline with one fixed configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimizer {
    policy: PromotionPolicy,
    floor_prefix_length: u8,
}

impl Optimizer {
    pub fn new(config: &Config) -> Self {
        Self {
            policy: PromotionPolicy::from(config),
            floor_prefix_length: config.floor_prefix_length,
        }
    }

    pub fn optimize<S: AsRef<str>>(&self, raw: &[S]) -> Result<Optimized, DenylistError> {
        let parsed = parse_entries(raw);
        if parsed.is_empty() && !raw.is_empty() {
            warn!("No valid entry among {} input strings", raw.len());
        }
        let outcome = promote(&parsed.hosts, &self.policy)?;
        let working_set = outcome.working_set(&parsed.networks);
        let compacted = compact(&working_set, self.floor_prefix_length);

        let summary = RunSummary {
            input_entries: raw.len(),
            parsed_hosts: parsed.hosts.len(),
            parsed_networks: parsed.networks.len(),
            dropped: parsed.dropped.len(),
            promoted_24: outcome.promoted_24_count,
            promoted_16: outcome.promoted_16_count,
            promoted_8: outcome.promoted_8.len(),
            refused_by_floor: compacted.refused.len(),
            output_entries: compacted.entries.len(),
            covered_ipv4: count_ipv4(&compacted.entries),
        };
        info!("{}", summary);

        Ok(Optimized {
            entries: compacted.entries,
            summary,
        })
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
