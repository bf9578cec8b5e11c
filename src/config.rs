//! Configuration management for the denylist optimizer.
//!
//! Values come from an optional YAML file, then environment overrides:
//!
//! | Key                         | Environment            | Default |
//! |-----------------------------|------------------------|---------|
//! | `denylist_path`             | `DENYLIST_PATH`        | `/usr/share/nginx/html/blacklist.json` |
//! | `min_hosts_per_slash24`     | `MIN_IPS_PER_24`       | 10      |
//! | `ratio_slash24_per_slash16` | `RATIO_24_PER_16`      | 0.5     |
//! | `ratio_slash16_per_slash8`  | `RATIO_16_PER_8`       | 0.5     |
//! | `floor_prefix_length`       | `MAX_AGGREGATE_PREFIX` | 8       |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::DenylistError;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/denylist-optimizer/config.yaml";
pub const DEFAULT_DENYLIST_PATH: &str = "/usr/share/nginx/html/blacklist.json";

const ENV_DENYLIST_PATH: &str = "DENYLIST_PATH";
const ENV_MIN_HOSTS: &str = "MIN_IPS_PER_24";
const ENV_RATIO_24_PER_16: &str = "RATIO_24_PER_16";
const ENV_RATIO_16_PER_8: &str = "RATIO_16_PER_8";
const ENV_FLOOR: &str = "MAX_AGGREGATE_PREFIX";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Denylist document read and rewritten in place
    pub denylist_path: PathBuf,

    /// Distinct hosts needed in a /24 to promote it
    pub min_hosts_per_slash24: usize,

    /// Share of the 256 /24s of a /16 needed to promote the /16
    pub ratio_slash24_per_slash16: f64,

    /// Share of the 256 /16s of a /8 needed to promote the /8
    pub ratio_slash16_per_slash8: f64,

    /// Coarsest block ever emitted
    pub floor_prefix_length: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            denylist_path: PathBuf::from(DEFAULT_DENYLIST_PATH),
            min_hosts_per_slash24: 10,
            ratio_slash24_per_slash16: 0.5,
            ratio_slash16_per_slash8: 0.5,
            floor_prefix_length: 8,
        }
    }
}

impl Config {
    /// Load configuration: YAML file if present, then environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read the YAML file, falling back to defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), DenylistError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DENYLIST_PATH) {
            self.denylist_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_MIN_HOSTS) {
            self.min_hosts_per_slash24 = parse_override(ENV_MIN_HOSTS, &value)?;
        }
        if let Some(value) = lookup(ENV_RATIO_24_PER_16) {
            self.ratio_slash24_per_slash16 = parse_override(ENV_RATIO_24_PER_16, &value)?;
        }
        if let Some(value) = lookup(ENV_RATIO_16_PER_8) {
            self.ratio_slash16_per_slash8 = parse_override(ENV_RATIO_16_PER_8, &value)?;
        }
        if let Some(value) = lookup(ENV_FLOOR) {
            self.floor_prefix_length = parse_override(ENV_FLOOR, &value)?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), DenylistError> {
        if self.min_hosts_per_slash24 < 1 {
            return Err(DenylistError::Config(
                "min_hosts_per_slash24 must be at least 1".to_string(),
            ));
        }
        validate_ratio("ratio_slash24_per_slash16", self.ratio_slash24_per_slash16)?;
        validate_ratio("ratio_slash16_per_slash8", self.ratio_slash16_per_slash8)?;
        if self.floor_prefix_length > 32 {
            return Err(DenylistError::Config(format!(
                "floor_prefix_length must be within 0..=32, got {}",
                self.floor_prefix_length
            )));
        }
        if self.denylist_path.as_os_str().is_empty() {
            return Err(DenylistError::Config(
                "denylist_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T, DenylistError> {
    value.trim().parse().map_err(|_| {
        DenylistError::Config(format!("Invalid value for {}: {:?}", key, value))
    })
}

fn validate_ratio(name: &str, ratio: f64) -> Result<(), DenylistError> {
    // NaN fails both comparisons
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(DenylistError::Config(format!(
            "{} must be within (0, 1], got {}",
            name, ratio
        )))
    }
}
