// Test doubles shared by the unit tests of this crate

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backend_domain::{
    AssessmentContext, EngineError, EventSource, LoginEvent, RetractRecord, RiskAssessor,
    RiskJudgment, RuntimeConfig, SourcePoll, SourceRecord,
};

use crate::AppState;

pub fn login(user: &str, ts: &str, country: &str) -> LoginEvent {
    LoginEvent {
        timestamp: ts.parse().expect("timestamp"),
        user_id: user.to_string(),
        ip_address: "198.51.100.7".to_string(),
        location: String::new(),
        city: "Somewhere".to_string(),
        country: country.to_string(),
        lat: 10.0,
        lon: 20.0,
    }
}

pub fn retract(alert_id: &str) -> SourceRecord {
    SourceRecord::Retract(RetractRecord {
        alert_id: Some(alert_id.to_string()),
        user_id: None,
        timestamp: None,
    })
}

pub fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        poll_interval_ms: 5,
        assessment_timeout_seconds: 1,
        assessment_max_attempts: 2,
        assessment_retry_backoff_ms: 0,
        ..RuntimeConfig::default()
    }
}

pub fn state_with(assessor: Arc<dyn RiskAssessor>) -> AppState {
    AppState::new(fast_config(), assessor)
}

#[derive(Clone, Copy)]
pub enum Behavior {
    Score(i64),
    Fail,
    Malformed,
    Hang,
}

/// Assessor with a fixed behavior that counts its calls.
pub struct FakeAssessor {
    behavior: Behavior,
    calls: AtomicU32,
}

impl FakeAssessor {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskAssessor for FakeAssessor {
    async fn assess(
        &self,
        context: &AssessmentContext,
        _timeout: Duration,
    ) -> Result<RiskJudgment, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Score(score) => Ok(RiskJudgment::new(
                score,
                format!("login from {}", context.country),
                "Review the session.",
            )),
            Behavior::Fail => Err(EngineError::AssessmentTransport("connection refused".into())),
            Behavior::Malformed => Err(EngineError::AssessmentMalformed("not json".into())),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    async fn check_target(&self) -> anyhow::Result<()> {
        match self.behavior {
            Behavior::Score(_) => Ok(()),
            _ => anyhow::bail!("assessor unavailable"),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Replays a fixed list of poll results, then reports the configured tail.
pub struct ScriptedSource {
    script: VecDeque<Result<SourcePoll, EngineError>>,
    tail: Result<SourcePoll, EngineError>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<SourcePoll, EngineError>>) -> Self {
        Self {
            script: script.into(),
            tail: Ok(SourcePoll::Exhausted),
        }
    }

    pub fn logins(events: Vec<LoginEvent>) -> Self {
        Self::new(
            events
                .into_iter()
                .map(|event| Ok(SourcePoll::Record(SourceRecord::Login(event))))
                .collect(),
        )
    }

    pub fn then(mut self, tail: Result<SourcePoll, EngineError>) -> Self {
        self.tail = tail;
        self
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn poll_next(&mut self) -> Result<SourcePoll, EngineError> {
        match self.script.pop_front() {
            Some(next) => next,
            None => self.tail.clone(),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
