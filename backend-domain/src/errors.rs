// Engine error kinds
// Only SourceFault may halt ingestion; every other kind is absorbed where it is detected.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("event source fault: {0}")]
    SourceFault(String),
    #[error("malformed event: {0}")]
    EventMalformed(String),
    #[error("risk assessment timed out after {0:?}")]
    AssessmentTimeout(Duration),
    #[error("malformed risk assessment: {0}")]
    AssessmentMalformed(String),
    #[error("risk assessment transport error: {0}")]
    AssessmentTransport(String),
    #[error("risk assessment cancelled")]
    AssessmentCancelled,
}

impl EngineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::SourceFault(_))
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        EngineError::EventMalformed(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_source_fault_is_fatal() {
        assert!(EngineError::SourceFault("closed".into()).is_fatal());
        assert!(!EngineError::malformed("bad json").is_fatal());
        assert!(!EngineError::AssessmentTimeout(Duration::from_secs(1)).is_fatal());
        assert!(!EngineError::AssessmentCancelled.is_fatal());
    }
}
