//! In-memory snapshot adapter

use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};
use domain_quoting::{SnapshotPort, SnapshotScope, UnderwritingSnapshot};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Serves a snapshot held in memory
///
/// The catalog can be swapped at runtime with [`replace`](Self::replace);
/// batches already running keep the snapshot they loaded.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshot {
    catalog: Arc<RwLock<UnderwritingSnapshot>>,
}

impl InMemorySnapshot {
    pub fn new(snapshot: UnderwritingSnapshot) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Replaces the whole catalog
    pub async fn replace(&self, snapshot: UnderwritingSnapshot) {
        *self.catalog.write().await = snapshot;
    }
}

impl DomainPort for InMemorySnapshot {}

#[async_trait]
impl SnapshotPort for InMemorySnapshot {
    async fn load_snapshot(&self, scope: &SnapshotScope) -> Result<UnderwritingSnapshot, PortError> {
        let snapshot = self.catalog.read().await.restrict(scope);
        debug!(
            rule_sets = snapshot.rule_sets.len(),
            premium_rows = snapshot.premium_rows.len(),
            "loaded in-memory snapshot"
        );
        Ok(snapshot)
    }
}
