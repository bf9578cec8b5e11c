//! Error types for the denylist optimizer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DenylistError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid prefix length: {0}")]
    Prefix(#[from] ipnet::PrefixLenError),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl DenylistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
