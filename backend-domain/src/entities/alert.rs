// Alert entity
// The materialized unit of the alert table, keyed by AlertId

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{LoginEvent, RiskJudgment};
use crate::value_objects::{AlertId, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "id", alias = "alert_id")]
    pub alert_id: AlertId,
    pub user: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub risk_score: u8,
    pub severity: RiskLevel,
    pub summary: String,
    pub recommended_action: String,
    pub geo: Geo,
}

impl Alert {
    pub fn from_judgment(event: &LoginEvent, judgment: RiskJudgment) -> Self {
        Self {
            alert_id: event.alert_id(),
            user: event.user_id.clone(),
            location: event.location.clone(),
            timestamp: event.timestamp,
            risk_score: judgment.risk_score,
            severity: judgment.severity(),
            summary: judgment.summary,
            recommended_action: judgment.recommended_action,
            geo: Geo {
                lat: event.lat,
                lon: event.lon,
            },
        }
    }
}

/// A single change to the alert table.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertChange {
    Upsert(Alert),
    Retract(AlertId),
}

impl AlertChange {
    pub fn alert_id(&self) -> &AlertId {
        match self {
            AlertChange::Upsert(alert) => &alert.alert_id,
            AlertChange::Retract(id) => id,
        }
    }
}
