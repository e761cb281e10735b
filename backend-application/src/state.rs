use std::sync::Arc;

use backend_domain::{PipelineStatus, RiskAssessor, RuntimeConfig};
use tokio::sync::RwLock;

use crate::{AlertMaterializer, AlertSnapshotStore, AssessmentPolicy, GuardedAssessor, HistoryStore, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub history: Arc<HistoryStore>,
    pub assessor: Arc<GuardedAssessor>,
    pub materializer: Arc<AlertMaterializer>,
    pub snapshots: Arc<AlertSnapshotStore>,
    pub metrics: Arc<Metrics>,
    pub pipeline_status: Arc<RwLock<PipelineStatus>>,
}

impl AppState {
    pub fn new(config: RuntimeConfig, assessor: Arc<dyn RiskAssessor>) -> Self {
        let snapshots = Arc::new(AlertSnapshotStore::new());
        let policy = AssessmentPolicy::from_config(&config);
        Self {
            history: Arc::new(HistoryStore::default()),
            assessor: Arc::new(GuardedAssessor::new(assessor, policy)),
            materializer: Arc::new(AlertMaterializer::new(snapshots.clone())),
            snapshots,
            metrics: Arc::new(Metrics::default()),
            pipeline_status: Arc::new(RwLock::new(PipelineStatus::default())),
            config,
        }
    }
}
