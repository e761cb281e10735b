use std::sync::Arc;

use backend_domain::{Alert, AlertId};

use crate::{AlertSnapshot, AppError, AppState};

/// Current alert snapshot, newest first. Never blocks on ingestion.
pub async fn list_alerts(state: &AppState) -> Arc<AlertSnapshot> {
    state.snapshots.read().await
}

pub async fn find_alert(state: &AppState, alert_id: &str) -> Result<Alert, AppError> {
    let alert_id = AlertId(alert_id.trim().to_string());
    let snapshot = state.snapshots.read().await;
    snapshot
        .alerts
        .iter()
        .find(|alert| alert.alert_id == alert_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("alert {} not found", alert_id)))
}
