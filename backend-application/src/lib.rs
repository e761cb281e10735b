// Backend Application Layer

pub mod assessor;
pub mod error;
pub mod history;
pub mod materializer;
pub mod metrics;
pub mod pipeline;
pub mod queries;
pub mod snapshot;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use assessor::{Assessment, AssessmentOutcome, AssessmentPolicy, GuardedAssessor};
pub use error::AppError;
pub use history::HistoryStore;
pub use materializer::AlertMaterializer;
pub use metrics::{Metrics, MetricsSnapshot};
pub use pipeline::{shutdown_channel, wait_for_shutdown, ShutdownTrigger, StreamPipeline};
pub use snapshot::{AlertSnapshot, AlertSnapshotStore};
pub use state::AppState;
