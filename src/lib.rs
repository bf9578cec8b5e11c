//! # denylist-optimizer - IP denylist compaction
//!
//! Turns a flat denylist of hosts and CIDR blocks into a small set of blocks
//! that a reverse proxy or firewall can check cheaply, and rewrites the list
//! atomically so concurrent readers never see a partial file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    denylist-optimizer                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: optimize, stats, version                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml + environment overrides)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Entry parser (ipnet)                                       │
//! │    └── "ip" / "ip/prefix" -> host or block, drop the rest   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Promotion: hosts -> /24 -> /16 -> /8                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator: collapse, floor filter, ordering               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Store: JSON document, temp file + rename, flock            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use denylist_optimizer::config::Config;
//! use denylist_optimizer::optimizer::Optimizer;
//!
//! let raw: Vec<String> = (1..=10).map(|i| format!("203.0.113.{}", i)).collect();
//! let optimized = Optimizer::new(&Config::default()).optimize(&raw).unwrap();
//! assert_eq!(optimized.entries[0].to_string(), "203.0.113.0/24");
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - CIDR collapsing, floor filter and output ordering
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`entry`] - Denylist entry parsing
//! - [`error`] - Error types
//! - [`fs_abstraction`] - Mockable filesystem primitives
//! - [`lock`] - File locking between concurrent runs
//! - [`optimizer`] - The end-to-end pipeline
//! - [`promotion`] - Hierarchical /24, /16, /8 promotion
//! - [`store`] - Denylist document I/O and atomic persistence
//! - [`utils`] - Formatting helpers

pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod entry;
pub mod error;
pub mod fs_abstraction;
pub mod lock;
pub mod optimizer;
pub mod promotion;
pub mod store;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use entry::DenyEntry;
pub use error::DenylistError;
pub use optimizer::{Optimized, Optimizer, RunSummary};
