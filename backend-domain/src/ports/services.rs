use std::time::Duration;

use async_trait::async_trait;

use crate::entities::{AssessmentContext, RiskJudgment};
use crate::errors::EngineError;

#[async_trait]
pub trait RiskAssessor: Send + Sync {
    /// One assessment attempt. Implementations must give up after `timeout`.
    async fn assess(
        &self,
        context: &AssessmentContext,
        timeout: Duration,
    ) -> Result<RiskJudgment, EngineError>;
    async fn check_target(&self) -> anyhow::Result<()>;
    fn name(&self) -> &'static str;
}
