//! Formatting helpers shared by the `optimize` and `stats` reports.

use crate::aggregator::coverage_percent;

const COUNT_UNITS: [(u64, &str); 3] = [(1_000_000_000, "G"), (1_000_000, "M"), (1_000, "K")];
const SIZE_UNITS: [(u64, &str); 3] = [(1 << 30, "GiB"), (1 << 20, "MiB"), (1 << 10, "KiB")];

/// Short form of an address or entry count, e.g. `16.8M` for a /8.
///
/// ```
/// use denylist_optimizer::utils::format_count;
/// assert_eq!(format_count(256), "256");
/// assert_eq!(format_count(65_536), "65.5K");
/// assert_eq!(format_count(16_777_216), "16.8M");
/// ```
pub fn format_count(count: u64) -> String {
    COUNT_UNITS
        .iter()
        .find(|(scale, _)| count >= *scale)
        .map(|(scale, unit)| format!("{:.1}{}", count as f64 / *scale as f64, unit))
        .unwrap_or_else(|| count.to_string())
}

/// Full count with comma-separated digit groups.
///
/// ```
/// use denylist_optimizer::utils::group_digits;
/// assert_eq!(group_digits(65_536), "65,536");
/// ```
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Size of the denylist document on disk.
pub fn format_file_size(bytes: u64) -> String {
    SIZE_UNITS
        .iter()
        .find(|(scale, _)| bytes >= *scale)
        .map(|(scale, unit)| format!("{:.1} {}", bytes as f64 / *scale as f64, unit))
        .unwrap_or_else(|| format!("{} B", bytes))
}

/// `"<n> IPv4 addresses (<pct>% of public IPv4 space)"`
pub fn format_coverage(covered_ipv4: u64) -> String {
    format!(
        "{} IPv4 addresses ({:.4}% of public IPv4 space)",
        group_digits(covered_ipv4),
        coverage_percent(covered_ipv4)
    )
}
