//! Robustness tests for edge cases and error conditions.
//!
//! These tests verify that the optimizer handles hostile or odd input gracefully.

use denylist_optimizer::aggregator::compact;
use denylist_optimizer::config::Config;
use denylist_optimizer::entry::{parse_entries, DenyEntry};
use denylist_optimizer::optimizer::Optimizer;

/// Test entry parsing edge cases
#[test]
fn test_entry_parsing_edge_cases() {
    // Valid edge cases
    assert!("0.0.0.0".parse::<DenyEntry>().is_ok());
    assert!("255.255.255.255".parse::<DenyEntry>().is_ok());
    assert!("::".parse::<DenyEntry>().is_ok());
    assert!("0.0.0.0/0".parse::<DenyEntry>().is_ok());
    assert!("::/128".parse::<DenyEntry>().is_ok());

    // Invalid cases - should fail gracefully
    assert!("1.2.3".parse::<DenyEntry>().is_err());
    assert!("1.2.3.4.5".parse::<DenyEntry>().is_err());
    assert!("192.168.1.1/-1".parse::<DenyEntry>().is_err());
    assert!("192.168.1.1/".parse::<DenyEntry>().is_err());
    assert!("192.168.1.1/24/8".parse::<DenyEntry>().is_err());
    assert!("::1/129".parse::<DenyEntry>().is_err());
}

/// Test Unicode handling in inputs
#[test]
fn test_unicode_handling() {
    assert!("１２３.０.０.１".parse::<DenyEntry>().is_err()); // Full-width digits
    assert!("192．168．1．1".parse::<DenyEntry>().is_err()); // Full-width periods
    assert!("192.168.1.1\u{200B}".parse::<DenyEntry>().is_err()); // Zero-width space
    assert!("192.168.1.0/24\u{FEFF}".parse::<DenyEntry>().is_err()); // BOM
}

/// Test empty and whitespace inputs
#[test]
fn test_empty_and_whitespace() {
    let parsed = parse_entries(&["", "   ", "\t\n", " 192.168.1.1 "]);
    assert_eq!(parsed.hosts.len(), 1);
    assert_eq!(parsed.dropped.len(), 3);
}

/// Test that a list made only of garbage yields an empty result
#[test]
fn test_all_malformed_input() {
    let out = Optimizer::default()
        .optimize(&["not-an-ip", "999.0.0.1", "10.0.0.0/99", "ftp://x"])
        .unwrap();
    assert!(out.entries.is_empty());
    assert_eq!(out.summary.dropped, 4);
}

/// Test large input handling
#[test]
fn test_large_input_handling() {
    // 256 * 200 hosts: every /24 in 100.64.0.0/16 gets 200 hosts
    let raw: Vec<String> = (0..51_200u32)
        .map(|i| format!("100.64.{}.{}", i % 256, (i / 256) % 200 + 1))
        .collect();

    let out = Optimizer::default().optimize(&raw).unwrap();
    assert_eq!(out.entries.len(), 1);
    assert_eq!(out.entries[0].to_string(), "100.64.0.0/16");
    assert_eq!(out.summary.promoted_24, 256);
}

/// Test that the floor holds even with the most aggressive thresholds
#[test]
fn test_floor_with_aggressive_thresholds() {
    let config = Config {
        min_hosts_per_slash24: 1,
        ratio_slash24_per_slash16: 1.0 / 256.0,
        ratio_slash16_per_slash8: 1.0 / 256.0,
        floor_prefix_length: 8,
        ..Default::default()
    };
    let raw: Vec<String> = (0..=255u16).map(|a| format!("{}.1.2.3", a)).collect();

    let out = Optimizer::new(&config).optimize(&raw).unwrap();
    assert_eq!(out.entries.len(), 256);
    assert!(out.entries.iter().all(|e| e.prefix_len() == 8));
}

/// Test that a floor of zero lets everything collapse to the whole space
#[test]
fn test_zero_floor_allows_full_collapse() {
    let raw: Vec<DenyEntry> = ["0.0.0.0/1", "128.0.0.0/1"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let compacted = compact(&raw, 0);
    assert_eq!(compacted.entries.len(), 1);
    assert_eq!(compacted.entries[0].to_string(), "0.0.0.0/0");
}

/// Test that YAML parsing handles malformed input
#[test]
fn test_yaml_malformed_input() {
    let result: Result<Config, _> = serde_yaml::from_str("{{{{not valid yaml");
    assert!(result.is_err());

    let result: Result<Config, _> = serde_yaml::from_str("floor_prefix_length: -3");
    assert!(result.is_err());
}

/// Test that JSON parsing handles malformed input
#[test]
fn test_json_malformed_input() {
    let result: Result<serde_json::Value, _> = serde_json::from_str("{\"blacklist\": [");
    assert!(result.is_err());
}
