//! JSON file snapshot adapter
//!
//! Reads an [`UnderwritingSnapshot`] document from disk on every load, so
//! edits to the file are picked up by the next batch. Rule sets with
//! validation errors are still loaded (a bad predicate degrades only its own
//! rule set at evaluation time) but are logged.

use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};
use domain_quoting::{SnapshotPort, SnapshotScope, UnderwritingSnapshot};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::error::SnapshotError;

/// Serves snapshots from a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSnapshot {
    path: PathBuf,
}

impl JsonFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the whole document
    pub async fn read(&self) -> Result<UnderwritingSnapshot, SnapshotError> {
        let document = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SnapshotError::io(&self.path, e))?;
        serde_json::from_str(&document).map_err(|source| SnapshotError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl DomainPort for JsonFileSnapshot {}

#[async_trait]
impl SnapshotPort for JsonFileSnapshot {
    #[instrument(skip(self, scope), fields(path = %self.path.display()))]
    async fn load_snapshot(&self, scope: &SnapshotScope) -> Result<UnderwritingSnapshot, PortError> {
        let snapshot = self.read().await?.restrict(scope);

        for (rule_set_id, report) in snapshot.validate() {
            for issue in &report.errors {
                warn!(rule_set_id = %rule_set_id, message = %issue.message, "rule set validation error");
            }
        }

        info!(
            rule_sets = snapshot.rule_sets.len(),
            premium_rows = snapshot.premium_rows.len(),
            "loaded snapshot file"
        );
        Ok(snapshot)
    }
}
