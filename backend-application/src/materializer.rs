use std::sync::Arc;

use backend_domain::{AlertChange, AlertTable, ApplyOutcome};
use tokio::sync::Mutex;
use tracing::debug;

use crate::snapshot::AlertSnapshotStore;

/// Owns the canonical alert table and publishes a fresh snapshot after every
/// effective change.
///
/// Each change is applied and published inside one critical section, so
/// snapshots are published in the same order changes are applied and no
/// reader can observe a half-applied change.
pub struct AlertMaterializer {
    table: Mutex<AlertTable>,
    snapshots: Arc<AlertSnapshotStore>,
}

impl AlertMaterializer {
    pub fn new(snapshots: Arc<AlertSnapshotStore>) -> Self {
        Self {
            table: Mutex::new(AlertTable::default()),
            snapshots,
        }
    }

    pub async fn apply(&self, change: AlertChange) -> ApplyOutcome {
        let mut table = self.table.lock().await;
        let alert_id = change.alert_id().clone();
        let outcome = table.apply(change);
        if outcome.is_change() {
            let version = self.snapshots.publish(table.ordered()).await;
            debug!(%alert_id, ?outcome, version, "alert table changed");
        }
        outcome
    }

    pub async fn live_count(&self) -> usize {
        self.table.lock().await.len()
    }
}
