use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use backend_domain::ports::RiskAssessor;
use backend_domain::{AssessmentContext, EngineError, RiskJudgment};

pub const STATIC_RISK_SCORE: i64 = 75;

/// Offline assessor used when no assessment endpoint is configured. Every
/// anomaly gets the same medium-risk judgment naming the new country.
#[derive(Debug, Default)]
pub struct StaticRiskAssessor;

impl StaticRiskAssessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RiskAssessor for StaticRiskAssessor {
    async fn assess(
        &self,
        context: &AssessmentContext,
        _timeout: Duration,
    ) -> Result<RiskJudgment, EngineError> {
        let summary = if context.previous_countries.is_empty() {
            format!(
                "First recorded login for {} from {} ({}).",
                context.user_id, context.country, context.location
            )
        } else {
            format!(
                "Login for {} from new country {} ({}); previously seen in {}.",
                context.user_id,
                context.country,
                context.location,
                context.previous_countries.join(", ")
            )
        };
        Ok(RiskJudgment::new(
            STATIC_RISK_SCORE,
            summary,
            "Confirm the login with the user before granting further access.",
        ))
    }

    async fn check_target(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::RiskLevel;
    use chrono::Utc;

    #[tokio::test]
    async fn names_new_and_previous_countries() {
        let context = AssessmentContext {
            user_id: "u1".to_string(),
            location: "Berlin, DE".to_string(),
            city: "Berlin".to_string(),
            country: "DE".to_string(),
            timestamp: Utc::now(),
            ip_address: String::new(),
            previous_countries: vec!["FR".to_string(), "US".to_string()],
        };
        let judgment = StaticRiskAssessor::new()
            .assess(&context, Duration::from_secs(1))
            .await
            .expect("judgment");
        assert_eq!(judgment.severity(), RiskLevel::MEDIUM);
        assert!(judgment.summary.contains("new country DE"));
        assert!(judgment.summary.contains("FR, US"));
    }
}
