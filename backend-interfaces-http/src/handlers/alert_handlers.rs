use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use backend_application::queries::alert_queries;
use backend_application::{AlertSnapshot, AppState};
use backend_domain::Alert;

use crate::error::HttpError;
use crate::middleware::authorize;

pub const SNAPSHOT_VERSION_HEADER: HeaderName = HeaderName::from_static("x-snapshot-version");

/// Serializes the alerts of a shared snapshot without copying them.
pub struct AlertList(Arc<AlertSnapshot>);

impl Serialize for AlertList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.alerts.serialize(serializer)
    }
}

pub async fn root_status() -> Json<Value> {
    Json(json!({ "Status": "Aura Sentinel Backend is Running" }))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let snapshot = alert_queries::list_alerts(&state).await;
    let version = HeaderValue::from(snapshot.version);
    Ok(([(SNAPSHOT_VERSION_HEADER, version)], Json(AlertList(snapshot))))
}

pub async fn get_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(alert_id): Path<String>,
) -> Result<Json<Alert>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let alert = alert_queries::find_alert(&state, &alert_id).await?;
    Ok(Json(alert))
}
