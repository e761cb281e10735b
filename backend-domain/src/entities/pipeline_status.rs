// Pipeline status entity

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Running,
    Draining,
    Faulted,
    Stopped,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
            PipelineState::Draining => "draining",
            PipelineState::Faulted => "faulted",
            PipelineState::Stopped => "stopped",
        }
    }

    /// Whether the pipeline is still accepting or finishing work.
    pub fn is_live(&self) -> bool {
        matches!(self, PipelineState::Running | PipelineState::Draining)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub source: String,
    pub live_alerts: usize,
    pub snapshot_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    pub updated_at: i64,
}
