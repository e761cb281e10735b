use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use backend_application::queries::ops_queries::{self, PipelineReport, Readiness};
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn get_pipeline(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PipelineReport>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(ops_queries::pipeline_report(&state).await))
}

pub async fn health_live(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn health_ready(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Readiness>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let readiness = ops_queries::readiness(&state).await;
    if !readiness.ready {
        warn!(pipeline = readiness.pipeline, "ready check failed");
        return Ok((StatusCode::SERVICE_UNAVAILABLE, Json(readiness)));
    }
    Ok((StatusCode::OK, Json(readiness)))
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return HttpError::Unauthorized.into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
