use std::sync::Arc;

use backend_domain::{current_millis, Alert};
use serde::Serialize;
use tokio::sync::RwLock;

/// Immutable, point-in-time view of the alert table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertSnapshot {
    pub version: u64,
    pub published_at: i64,
    pub alerts: Vec<Alert>,
}

/// Read replica of the alert table.
///
/// Readers clone an `Arc` under a read lock and iterate without any lock;
/// writers hold the write lock only to swap the pointer. Both sides are
/// constant time regardless of table size.
#[derive(Debug, Default)]
pub struct AlertSnapshotStore {
    current: RwLock<Arc<AlertSnapshot>>,
}

impl AlertSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current snapshot and returns its version.
    pub async fn publish(&self, alerts: Vec<Alert>) -> u64 {
        let mut current = self.current.write().await;
        let version = current.version + 1;
        *current = Arc::new(AlertSnapshot {
            version,
            published_at: current_millis(),
            alerts,
        });
        version
    }

    pub async fn read(&self) -> Arc<AlertSnapshot> {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty_at_version_zero() {
        let store = AlertSnapshotStore::new();
        let snapshot = store.read().await;
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.alerts.is_empty());
    }

    #[tokio::test]
    async fn held_snapshot_is_unaffected_by_later_publish() {
        let store = AlertSnapshotStore::new();
        store.publish(Vec::new()).await;
        let held = store.read().await;
        let version = store.publish(Vec::new()).await;
        assert_eq!(held.version, 1);
        assert_eq!(version, 2);
        assert_eq!(store.read().await.version, 2);
    }
}
