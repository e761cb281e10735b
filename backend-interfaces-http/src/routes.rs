use axum::routing::get;
use axum::Router;

use backend_application::AppState;

use crate::handlers::{alert_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(alert_handlers::root_status))
        .route("/api/alerts", get(alert_handlers::list_alerts))
        .route("/api/alerts/:alert_id", get(alert_handlers::get_alert))
        .route("/v2/ops/pipeline", get(ops_handlers::get_pipeline))
        .route("/v2/ops/health/live", get(ops_handlers::health_live))
        .route("/v2/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v2/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
