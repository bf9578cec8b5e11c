//! Denylist entry parsing.
//!
//! Each raw string is either a bare address (`203.0.113.7`) or a CIDR block
//! (`203.0.113.0/24`). Blocks are parsed non-strictly: host bits present in
//! the literal are masked off instead of rejected.

use ipnet::IpNet;
use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::{info, warn};

/// A single denylist entry: one host or one network block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DenyEntry {
    Host(IpAddr),
    Network(IpNet),
}

impl DenyEntry {
    /// Prefix length used for ordering. Hosts count as full-length.
    pub fn prefix_len(&self) -> u8 {
        match self {
            DenyEntry::Host(IpAddr::V4(_)) => 32,
            DenyEntry::Host(IpAddr::V6(_)) => 128,
            DenyEntry::Network(net) => net.prefix_len(),
        }
    }

    /// The entry as a network (hosts become /32 or /128).
    pub fn as_net(&self) -> IpNet {
        match self {
            DenyEntry::Host(ip) => IpNet::from(*ip),
            DenyEntry::Network(net) => *net,
        }
    }
}

impl fmt::Display for DenyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyEntry::Host(ip) => write!(f, "{}", ip),
            DenyEntry::Network(net) => write!(f, "{}", net),
        }
    }
}

/// Error returned when a string is neither an address nor a CIDR block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEntryError(pub String);

impl fmt::Display for ParseEntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid denylist entry: {:?}", self.0)
    }
}

impl std::error::Error for ParseEntryError {}

impl FromStr for DenyEntry {
    type Err = ParseEntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains('/') {
            trimmed
                .parse::<IpNet>()
                .map(|net| DenyEntry::Network(net.trunc()))
                .map_err(|_| ParseEntryError(s.to_string()))
        } else {
            trimmed
                .parse::<IpAddr>()
                .map(DenyEntry::Host)
                .map_err(|_| ParseEntryError(s.to_string()))
        }
    }
}

/// Result of parsing a raw denylist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEntries {
    /// Distinct host addresses, both families.
    pub hosts: BTreeSet<IpAddr>,
    /// Distinct pre-existing network blocks, truncated to canonical form.
    pub networks: BTreeSet<IpNet>,
    /// Raw strings that could not be parsed.
    pub dropped: Vec<String>,
}

impl ParsedEntries {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.networks.is_empty()
    }
}

/// Parse raw denylist strings, dropping (and logging) malformed ones.
pub fn parse_entries<S: AsRef<str>>(raw: &[S]) -> ParsedEntries {
    let mut parsed = ParsedEntries::default();

    for item in raw {
        let item = item.as_ref();
        match item.parse::<DenyEntry>() {
            Ok(DenyEntry::Host(ip)) => {
                parsed.hosts.insert(ip);
            }
            Ok(DenyEntry::Network(net)) => {
                parsed.networks.insert(net);
            }
            Err(e) => {
                warn!("Dropping {}", e);
                parsed.dropped.push(item.to_string());
            }
        }
    }

    info!(
        "Loaded: {} individual IPs, {} subnets ({} dropped)",
        parsed.hosts.len(),
        parsed.networks.len(),
        parsed.dropped.len()
    );

    parsed
}
