use std::path::PathBuf;

use keydate_catalog::{LoadReport, RuleSet};

use crate::error::StoreError;

/// Reads the pricing-rules file. Malformed records are dropped by the loader;
/// only an unreadable file fails.
pub struct RuleRepository {
    path: PathBuf,
}

impl RuleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<LoadReport, StoreError> {
        let source = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        let report = RuleSet::from_json(&source).map_err(|source| StoreError::Rules {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.path.display(),
            loaded = report.rules.len(),
            rejected = report.rejected.len(),
            "Loaded pricing rules"
        );

        Ok(report)
    }
}
