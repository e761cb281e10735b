use std::time::Duration;

use backend_domain::PipelineStatus;
use serde::Serialize;
use tokio::time::timeout;
use tracing::warn;

use crate::{AppState, MetricsSnapshot};

const READINESS_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    #[serde(flatten)]
    pub status: PipelineStatus,
    pub tracked_users: usize,
    pub assessor: &'static str,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub pipeline: &'static str,
    pub assessor: String,
}

pub async fn pipeline_report(state: &AppState) -> PipelineReport {
    let status = state.pipeline_status.read().await.clone();
    PipelineReport {
        status,
        tracked_users: state.history.user_count().await,
        assessor: state.assessor.name(),
        metrics: state.metrics.snapshot(),
    }
}

/// Ready while the pipeline is live and the assessor answers its probe.
/// A failing assessor alone still degrades to fallback alerts, so it is
/// reported but only the pipeline state decides readiness.
pub async fn readiness(state: &AppState) -> Readiness {
    let pipeline = state.pipeline_status.read().await.state;
    let assessor = match timeout(READINESS_PROBE_TIMEOUT, state.assessor.check_target()).await {
        Ok(Ok(())) => "ok".to_string(),
        Ok(Err(err)) => {
            warn!(error = %err, "assessor readiness probe failed");
            format!("degraded: {}", err)
        }
        Err(_) => "degraded: probe timed out".to_string(),
    };
    Readiness {
        ready: pipeline.is_live(),
        pipeline: pipeline.as_str(),
        assessor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{state_with, Behavior, FakeAssessor};
    use backend_domain::PipelineState;

    #[tokio::test]
    async fn idle_pipeline_is_not_ready() {
        let state = state_with(FakeAssessor::new(Behavior::Score(10)));
        let readiness = readiness(&state).await;
        assert!(!readiness.ready);
        assert_eq!(readiness.pipeline, "idle");
        assert_eq!(readiness.assessor, "ok");
    }

    #[tokio::test]
    async fn running_pipeline_with_failing_assessor_is_ready_but_degraded() {
        let state = state_with(FakeAssessor::new(Behavior::Fail));
        state.pipeline_status.write().await.state = PipelineState::Running;
        let readiness = readiness(&state).await;
        assert!(readiness.ready);
        assert!(readiness.assessor.starts_with("degraded"));
    }

    #[tokio::test]
    async fn report_includes_metrics_and_assessor() {
        let state = state_with(FakeAssessor::new(Behavior::Score(10)));
        state.metrics.record_event();
        let report = pipeline_report(&state).await;
        assert_eq!(report.assessor, "fake");
        assert_eq!(report.metrics.events, 1);
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["state"], "idle");
    }
}
