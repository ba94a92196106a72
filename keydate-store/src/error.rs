use std::path::PathBuf;

use keydate_catalog::{market::MarketError, RuleLoadError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable rules file {path}: {source}")]
    Rules {
        path: PathBuf,
        #[source]
        source: RuleLoadError,
    },

    #[error("Malformed inventory file {path}: {source}")]
    Inventory {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed market index {path}: {source}")]
    Market {
        path: PathBuf,
        #[source]
        source: MarketError,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}
