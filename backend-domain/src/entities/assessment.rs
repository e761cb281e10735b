// Anomaly decision and risk assessment entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::LoginEvent;
use crate::value_objects::RiskLevel;

pub const FALLBACK_RISK_SCORE: u8 = 90;
pub const FALLBACK_SUMMARY: &str = "Analysis failed.";
pub const FALLBACK_ACTION: &str = "Manual review required.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyDecision {
    pub is_anomaly: bool,
    /// Countries known for the user before this event, sorted.
    pub previous_countries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskJudgment {
    pub risk_score: u8,
    pub summary: String,
    pub recommended_action: String,
}

impl RiskJudgment {
    pub fn new(risk_score: i64, summary: impl Into<String>, recommended_action: impl Into<String>) -> Self {
        Self {
            risk_score: risk_score.clamp(0, 100) as u8,
            summary: summary.into(),
            recommended_action: recommended_action.into(),
        }
    }

    /// Substituted whenever the external assessment cannot be obtained.
    pub fn fallback() -> Self {
        Self {
            risk_score: FALLBACK_RISK_SCORE,
            summary: FALLBACK_SUMMARY.to_string(),
            recommended_action: FALLBACK_ACTION.to_string(),
        }
    }

    pub fn severity(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

/// Structured context handed to the risk-assessment service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentContext {
    pub user_id: String,
    pub location: String,
    pub city: String,
    pub country: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub previous_countries: Vec<String>,
}

impl AssessmentContext {
    pub fn new(event: &LoginEvent, decision: &AnomalyDecision) -> Self {
        Self {
            user_id: event.user_id.clone(),
            location: event.location.clone(),
            city: event.city.clone(),
            country: event.country.clone(),
            timestamp: event.timestamp,
            ip_address: event.ip_address.clone(),
            previous_countries: decision.previous_countries.clone(),
        }
    }
}
