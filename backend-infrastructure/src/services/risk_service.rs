use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use backend_domain::ports::RiskAssessor;
use backend_domain::{AssessmentContext, EngineError, RiskJudgment};

const REQUEST_ID_HEADER: &str = "x-request-id";
const TARGET_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Risk assessment over HTTP: the context is POSTed as JSON and the reply
/// is decoded into a `RiskJudgment`.
pub struct HttpRiskAssessor {
    client: Client,
    url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireJudgment {
    risk_score: f64,
    summary: String,
    recommended_action: String,
}

impl HttpRiskAssessor {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sentinel-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

#[async_trait]
impl RiskAssessor for HttpRiskAssessor {
    async fn assess(
        &self,
        context: &AssessmentContext,
        timeout: Duration,
    ) -> Result<RiskJudgment, EngineError> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .header(REQUEST_ID_HEADER, &request_id)
            .json(context);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                EngineError::AssessmentTimeout(timeout)
            } else {
                EngineError::AssessmentTransport(err.to_string())
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::AssessmentTransport(format!(
                "assessor responded {}",
                status
            )));
        }
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                EngineError::AssessmentTimeout(timeout)
            } else {
                EngineError::AssessmentTransport(err.to_string())
            }
        })?;
        debug!(%request_id, user_id = %context.user_id, "assessor replied");
        parse_judgment(&body)
    }

    async fn check_target(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.url)
            .timeout(TARGET_CHECK_TIMEOUT)
            .send()
            .await?;
        if response.status().is_server_error() {
            anyhow::bail!("assessor responded {}", response.status());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Accepts a judgment object, or an envelope whose `content`/`text` string
/// holds one. Either may be wrapped in a Markdown code fence.
pub fn parse_judgment(body: &str) -> Result<RiskJudgment, EngineError> {
    let value: Value = serde_json::from_str(strip_code_fence(body))
        .map_err(|err| EngineError::AssessmentMalformed(err.to_string()))?;
    let value = match envelope_text(&value) {
        Some(text) => serde_json::from_str(strip_code_fence(text))
            .map_err(|err| EngineError::AssessmentMalformed(format!("envelope: {}", err)))?,
        None => value,
    };
    let wire: WireJudgment = serde_json::from_value(value)
        .map_err(|err| EngineError::AssessmentMalformed(err.to_string()))?;
    if !wire.risk_score.is_finite() {
        return Err(EngineError::AssessmentMalformed(
            "risk_score is not a finite number".to_string(),
        ));
    }
    Ok(RiskJudgment::new(
        wire.risk_score.round() as i64,
        wire.summary.trim(),
        wire.recommended_action.trim(),
    ))
}

fn envelope_text(value: &Value) -> Option<&str> {
    ["content", "text"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
