// Risk level value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    LOW,
    MEDIUM,
    HIGH,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            RiskLevel::HIGH
        } else if score >= 70 {
            RiskLevel::MEDIUM
        } else {
            RiskLevel::LOW
        }
    }
}
