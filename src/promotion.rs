//! Hierarchical promotion of hosts into /24, /16 and /8 blocks.
//!
//! Three fixed passes, each with its own threshold:
//!
//! 1. hosts are grouped by containing /24; a group with at least
//!    `min_hosts_per_slash24` distinct hosts becomes that /24.
//! 2. promoted /24s are grouped by containing /16; the /16 is promoted when
//!    the share of its 256 possible /24 children present reaches
//!    `ratio_slash24_per_slash16`.
//! 3. the same again from /16 to /8 with `ratio_slash16_per_slash8`.
//!
//! Only blocks promoted by the previous pass take part in the next one, so a
//! /8 can never appear without its /16s having been confirmed first.
//! A pass whose parent is broader than the floor prefix is skipped, and its
//! inputs are kept as they are.
//! Promotion runs on IPv4 hosts only. IPv6 hosts are retained as-is.

use ipnet::{IpNet, Ipv4Net, PrefixLenError};
use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, info};

use crate::config::Config;
use crate::entry::DenyEntry;

/// Number of child blocks one level below any parent (/24 in /16, /16 in /8).
const CHILDREN_PER_PARENT: f64 = 256.0;

/// Thresholds for the three promotion passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionPolicy {
    pub min_hosts_per_slash24: usize,
    pub ratio_slash24_per_slash16: f64,
    pub ratio_slash16_per_slash8: f64,
    pub floor_prefix_length: u8,
}

impl PromotionPolicy {
    /// Whether blocks at `level` may be emitted under the floor.
    pub fn allows(&self, level: Level) -> bool {
        level.prefix_len() >= self.floor_prefix_length
    }
}

impl Default for PromotionPolicy {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PromotionPolicy {
    fn from(config: &Config) -> Self {
        Self {
            min_hosts_per_slash24: config.min_hosts_per_slash24,
            ratio_slash24_per_slash16: config.ratio_slash24_per_slash16,
            ratio_slash16_per_slash8: config.ratio_slash16_per_slash8,
            floor_prefix_length: config.floor_prefix_length,
        }
    }
}

/// Promotion levels, coarsest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Slash24,
    Slash16,
    Slash8,
}

impl Level {
    pub fn prefix_len(self) -> u8 {
        match self {
            Level::Slash24 => 24,
            Level::Slash16 => 16,
            Level::Slash8 => 8,
        }
    }
}

/// The block at `level` containing `addr`.
fn containing_block(addr: Ipv4Addr, level: Level) -> Result<Ipv4Net, PrefixLenError> {
    Ok(Ipv4Net::new(addr, level.prefix_len())?.trunc())
}

/// Output of the three promotion passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionOutcome {
    pub promoted_8: BTreeSet<Ipv4Net>,
    pub remaining_16: BTreeSet<Ipv4Net>,
    pub remaining_24: BTreeSet<Ipv4Net>,
    pub retained_hosts: BTreeSet<IpAddr>,
    /// /24 blocks promoted from hosts in pass 1, before pass 2 consumed any.
    pub promoted_24_count: usize,
    /// /16 blocks promoted in pass 2, before pass 3 consumed any.
    pub promoted_16_count: usize,
}

impl PromotionOutcome {
    /// Union of all pass outputs with the blocks that were already in the input.
    pub fn working_set(&self, preexisting: &BTreeSet<IpNet>) -> Vec<DenyEntry> {
        self.promoted_8
            .iter()
            .chain(&self.remaining_16)
            .chain(&self.remaining_24)
            .map(|net| DenyEntry::Network(IpNet::V4(*net)))
            .chain(self.retained_hosts.iter().map(|ip| DenyEntry::Host(*ip)))
            .chain(preexisting.iter().map(|net| DenyEntry::Network(*net)))
            .collect()
    }
}

/// Pass 1: group hosts by /24 and promote groups meeting `min_hosts`.
///
/// Returns the promoted /24s and the hosts left below threshold.
pub fn promote_hosts(
    hosts: &BTreeSet<IpAddr>,
    min_hosts: usize,
) -> Result<(BTreeSet<Ipv4Net>, BTreeSet<IpAddr>), PrefixLenError> {
    let mut groups: BTreeMap<Ipv4Net, BTreeSet<Ipv4Addr>> = BTreeMap::new();
    let mut retained = BTreeSet::new();

    for ip in hosts {
        match ip {
            IpAddr::V4(v4) => {
                groups
                    .entry(containing_block(*v4, Level::Slash24)?)
                    .or_default()
                    .insert(*v4);
            }
            IpAddr::V6(_) => {
                retained.insert(*ip);
            }
        }
    }

    let mut promoted = BTreeSet::new();
    for (subnet, members) in groups {
        if members.len() >= min_hosts {
            info!(
                "Promoted {} IPs to {} (threshold {})",
                members.len(),
                subnet,
                min_hosts
            );
            for ip in &members {
                debug!("   - {}", ip);
            }
            promoted.insert(subnet);
        } else {
            retained.extend(members.into_iter().map(IpAddr::V4));
        }
    }

    if !retained.is_empty() {
        info!(
            "Retained {} individual IPs (fewer than {} per /24)",
            retained.len(),
            min_hosts
        );
        for ip in &retained {
            debug!("   - {}", ip);
        }
    }

    Ok((promoted, retained))
}

/// Passes 2 and 3: group `children` by their block at `parent` and promote
/// groups whose occupancy reaches `ratio`.
///
/// Returns the promoted parents and the children that stay as they are.
pub fn promote_blocks(
    children: &BTreeSet<Ipv4Net>,
    parent: Level,
    ratio: f64,
) -> Result<(BTreeSet<Ipv4Net>, BTreeSet<Ipv4Net>), PrefixLenError> {
    let mut groups: BTreeMap<Ipv4Net, BTreeSet<Ipv4Net>> = BTreeMap::new();
    for child in children {
        groups
            .entry(containing_block(child.network(), parent)?)
            .or_default()
            .insert(*child);
    }

    let required = CHILDREN_PER_PARENT * ratio;
    let mut promoted = BTreeSet::new();
    let mut remaining = BTreeSet::new();

    for (subnet, subs) in groups {
        let occupancy = subs.len() as f64 / CHILDREN_PER_PARENT;
        if subs.len() as f64 >= required {
            info!(
                "Promoted {} subnets to {} (occupancy {:.3} >= {})",
                subs.len(),
                subnet,
                occupancy,
                ratio
            );
            for s in &subs {
                debug!("   - {}", s);
            }
            promoted.insert(subnet);
        } else {
            debug!(
                "Kept {} subnets under {} (occupancy {:.3} < {})",
                subs.len(),
                subnet,
                occupancy,
                ratio
            );
            remaining.extend(subs);
        }
    }

    Ok((promoted, remaining))
}

fn skip_pass(level: Level, floor: u8) {
    debug!(
        "Skipping promotion to /{}: broader than floor /{}",
        level.prefix_len(),
        floor
    );
}

/// Run all three passes over `hosts`, skipping those the floor forbids.
pub fn promote(
    hosts: &BTreeSet<IpAddr>,
    policy: &PromotionPolicy,
) -> Result<PromotionOutcome, PrefixLenError> {
    let floor = policy.floor_prefix_length;

    let (promoted_24, retained_hosts) = if policy.allows(Level::Slash24) {
        promote_hosts(hosts, policy.min_hosts_per_slash24)?
    } else {
        skip_pass(Level::Slash24, floor);
        (BTreeSet::new(), hosts.clone())
    };
    let (promoted_16, remaining_24) = if policy.allows(Level::Slash16) {
        promote_blocks(&promoted_24, Level::Slash16, policy.ratio_slash24_per_slash16)?
    } else {
        skip_pass(Level::Slash16, floor);
        (BTreeSet::new(), promoted_24.clone())
    };
    let (promoted_8, remaining_16) = if policy.allows(Level::Slash8) {
        promote_blocks(&promoted_16, Level::Slash8, policy.ratio_slash16_per_slash8)?
    } else {
        skip_pass(Level::Slash8, floor);
        (BTreeSet::new(), promoted_16.clone())
    };

    Ok(PromotionOutcome {
        promoted_24_count: promoted_24.len(),
        promoted_16_count: promoted_16.len(),
        promoted_8,
        remaining_16,
        remaining_24,
        retained_hosts,
    })
}
