use std::sync::Arc;
use std::time::Duration;

use backend_domain::{AssessmentContext, EngineError, RiskAssessor, RiskJudgment, RuntimeConfig};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::pipeline::wait_for_shutdown;

#[derive(Debug, Clone)]
pub struct AssessmentPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl AssessmentPolicy {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.assessment_timeout_seconds.max(1)),
            max_attempts: config.assessment_max_attempts.max(1),
            backoff: Duration::from_millis(config.assessment_retry_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentOutcome {
    Assessed { attempts: u32 },
    Fallback { reason: EngineError, attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct Assessment {
    pub judgment: RiskJudgment,
    pub outcome: AssessmentOutcome,
}

impl Assessment {
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, AssessmentOutcome::Fallback { .. })
    }
}

/// Wraps a `RiskAssessor` with a hard per-attempt timeout, bounded retries
/// and the fallback judgment. Never returns an error.
pub struct GuardedAssessor {
    inner: Arc<dyn RiskAssessor>,
    policy: AssessmentPolicy,
}

impl GuardedAssessor {
    pub fn new(inner: Arc<dyn RiskAssessor>, policy: AssessmentPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub async fn check_target(&self) -> anyhow::Result<()> {
        self.inner.check_target().await
    }

    /// Shutdown observed mid-attempt or mid-backoff cancels the call and
    /// yields the fallback immediately.
    pub async fn assess(
        &self,
        context: &AssessmentContext,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Assessment {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = 0;
        let mut last_error = EngineError::AssessmentCancelled;

        while attempts < max_attempts {
            if *shutdown.borrow() {
                last_error = EngineError::AssessmentCancelled;
                break;
            }
            attempts += 1;

            let result = tokio::select! {
                result = timeout(self.policy.timeout, self.inner.assess(context, self.policy.timeout)) => {
                    result.unwrap_or(Err(EngineError::AssessmentTimeout(self.policy.timeout)))
                }
                _ = wait_for_shutdown(shutdown) => Err(EngineError::AssessmentCancelled),
            };

            match result {
                Ok(judgment) => {
                    debug!(user_id = %context.user_id, attempts, "risk assessment succeeded");
                    return Assessment {
                        judgment,
                        outcome: AssessmentOutcome::Assessed { attempts },
                    };
                }
                Err(EngineError::AssessmentCancelled) => {
                    last_error = EngineError::AssessmentCancelled;
                    break;
                }
                Err(err) => {
                    warn!(
                        user_id = %context.user_id,
                        assessor = self.inner.name(),
                        attempt = attempts,
                        error = %err,
                        "risk assessment attempt failed"
                    );
                    last_error = err;
                }
            }

            if attempts < max_attempts && !self.policy.backoff.is_zero() {
                let delay = self.policy.backoff * attempts;
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = wait_for_shutdown(shutdown) => {
                        last_error = EngineError::AssessmentCancelled;
                        break;
                    }
                }
            }
        }

        warn!(
            user_id = %context.user_id,
            attempts,
            reason = %last_error,
            "using fallback risk judgment"
        );
        Assessment {
            judgment: RiskJudgment::fallback(),
            outcome: AssessmentOutcome::Fallback {
                reason: last_error,
                attempts,
            },
        }
    }
}
