use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use backend_application::AppState;
use backend_domain::{AssessorConfig, EventSource, RiskAssessor};
use backend_infrastructure::{AppConfig, HttpRiskAssessor, JsonLinesSource, StaticRiskAssessor};

pub struct AppContext {
    pub state: AppState,
    pub source: Box<dyn EventSource>,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let source_config = config.to_source_config();
        let assessor = build_assessor(&config.to_assessor_config())?;

        info!(
            events_path = %source_config.events_path,
            follow = source_config.follow_events,
            assessor = assessor.name(),
            "engine configured"
        );

        Ok(Self {
            state: AppState::new(runtime_config, assessor),
            source: Box::new(JsonLinesSource::from_config(&source_config)),
        })
    }
}

fn build_assessor(config: &AssessorConfig) -> Result<Arc<dyn RiskAssessor>> {
    match &config.assessor_url {
        Some(url) => Ok(Arc::new(HttpRiskAssessor::new(
            url.clone(),
            config.assessor_token.clone(),
        )?)),
        None => {
            warn!("assessor_url not configured, using static risk assessor");
            Ok(Arc::new(StaticRiskAssessor::new()))
        }
    }
}
