//! CIDR collapsing and floor filtering of the promoted working set.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use tracing::{debug, warn};

use crate::entry::DenyEntry;

/// Result of collapsing a working set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compacted {
    /// Minimal covering set, sorted for output.
    pub entries: Vec<DenyEntry>,
    /// Blocks refused because they are broader than the floor.
    pub refused: Vec<IpNet>,
}

/// Collapse a working set into its minimal covering form.
///
/// Blocks broader than `floor` are refused first, so whatever they would
/// have absorbed survives on its own. The same floor bounds [`collapse`].
/// Hosts take part as full-length blocks and come back out as hosts when
/// nothing absorbed them.
pub fn compact(working_set: &[DenyEntry], floor: u8) -> Compacted {
    let (nets, mut refused) = apply_floor(working_set, floor);
    let collapsed = collapse(&nets, floor);

    let mut entries: Vec<DenyEntry> = collapsed.into_iter().map(to_entry).collect();
    sort_entries(&mut entries);

    refused.sort();
    refused.dedup();

    debug!(
        "Collapsed {} entries into {} ({} refused by floor /{})",
        working_set.len(),
        entries.len(),
        refused.len(),
        floor
    );

    Compacted { entries, refused }
}

/// Split entries into the networks to collapse and the blocks broader than `floor`.
///
/// Host addresses are never refused.
pub fn apply_floor(entries: &[DenyEntry], floor: u8) -> (Vec<IpNet>, Vec<IpNet>) {
    let mut kept = Vec::with_capacity(entries.len());
    let mut refused = Vec::new();

    for entry in entries {
        match entry {
            DenyEntry::Network(net) if net.prefix_len() < floor => {
                warn!(
                    "Refusing {}: broader than floor /{} (prefix /{})",
                    net,
                    floor,
                    net.prefix_len()
                );
                refused.push(*net);
            }
            _ => kept.push(entry.as_net()),
        }
    }

    (kept, refused)
}

/// Merge a list of networks into a minimal covering set.
///
/// Contained blocks are dropped and contiguous blocks are merged, but never
/// into a block broader than `floor`: an aggregate wider than that is split
/// back into its `floor`-sized subnets. IPv4 and IPv6 blocks are aggregated
/// separately.
///
/// For example: [192.168.0.0/25, 192.168.0.128/25] -> [192.168.0.0/24]
pub fn collapse(nets: &[IpNet], floor: u8) -> Vec<IpNet> {
    // Separate IPv4 and IPv6
    let v4_nets: Vec<Ipv4Net> = nets
        .iter()
        .filter_map(|n| match n {
            IpNet::V4(v4) => Some(*v4),
            _ => None,
        })
        .collect();
    let v6_nets: Vec<Ipv6Net> = nets
        .iter()
        .filter_map(|n| match n {
            IpNet::V6(v6) => Some(*v6),
            _ => None,
        })
        .collect();

    // Use ipnet's native aggregate function
    let aggregated = Ipv4Net::aggregate(&v4_nets)
        .into_iter()
        .map(IpNet::V4)
        .chain(Ipv6Net::aggregate(&v6_nets).into_iter().map(IpNet::V6));

    let mut collapsed = Vec::new();
    for net in aggregated {
        if net.prefix_len() >= floor {
            collapsed.push(net);
            continue;
        }
        // Every input is at least floor-long, so each floor-sized subnet is fully covered
        match net.subnets(floor) {
            Ok(subnets) => collapsed.extend(subnets),
            Err(_) => collapsed.push(net),
        }
    }
    collapsed
}

/// Full-length blocks are written back as bare addresses.
fn to_entry(net: IpNet) -> DenyEntry {
    if net.prefix_len() == net.max_prefix_len() {
        DenyEntry::Host(net.addr())
    } else {
        DenyEntry::Network(net)
    }
}

/// Order entries by prefix length, then by their string form.
pub fn sort_entries(entries: &mut [DenyEntry]) {
    entries.sort_by_cached_key(|e| (e.prefix_len(), e.to_string()));
}

/// Calculate the total number of individual IPv4 addresses covered by a list of entries.
///
/// Entries are assumed disjoint, as produced by [`compact`].
pub fn count_ipv4(entries: &[DenyEntry]) -> u64 {
    entries
        .iter()
        .filter_map(|entry| match entry.as_net() {
            IpNet::V4(net) => Some(1u64 << (32 - u32::from(net.prefix_len()))),
            IpNet::V6(_) => None,
        })
        .sum()
}

/// Calculate what percentage of the public IPv4 space is covered.
/// Public IPv4 space is approximately 3.7 billion addresses.
pub fn coverage_percent(ip_count: u64) -> f64 {
    const PUBLIC_IPV4_APPROX: f64 = 3_700_000_000.0;
    (ip_count as f64 / PUBLIC_IPV4_APPROX) * 100.0
}
