use std::env;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{AssessorConfig, RuntimeConfig, SourceConfig};

use crate::config::validation::{validate_http_url, validate_range};
use crate::utils::{non_blank, parse_env_bool, parse_env_list, resolve_path};

pub const CONFIG_ENV: &str = "SENTINEL_CONFIG";
pub const EVENTS_PATH_ENV: &str = "SENTINEL_EVENTS_PATH";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub cors_origins: Vec<String>,
    pub events_path: String,
    pub follow_events: bool,
    pub poll_interval_ms: u64,
    pub assessor_url: Option<String>,
    pub assessor_token: Option<String>,
    pub assessment_timeout_seconds: u64,
    pub assessment_max_attempts: u32,
    pub assessment_retry_backoff_ms: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            api_token: None,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            events_path: "./events.jsonl".to_string(),
            follow_events: true,
            poll_interval_ms: runtime.poll_interval_ms,
            assessor_url: None,
            assessor_token: None,
            assessment_timeout_seconds: runtime.assessment_timeout_seconds,
            assessment_max_attempts: runtime.assessment_max_attempts,
            assessment_retry_backoff_ms: runtime.assessment_retry_backoff_ms,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
        }
    }
}

impl AppConfig {
    /// Loads the file named by `SENTINEL_CONFIG`, then applies `SENTINEL_*`
    /// overrides from the process environment.
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(Path::new(&path), |key| env::var(key).ok()).await
    }

    pub async fn load_from(
        file_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path)
                .await
                .with_context(|| format!("failed to read {}", file_path.display()))?;
            let mut config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", file_path.display()))?;
            config.resolve_paths(file_path.parent());
            config
        } else {
            warn!(path = %file_path.display(), "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_overrides(lookup);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.assessor_url = non_blank(self.assessor_url.take());
        self.assessor_token = non_blank(self.assessor_token.take());
        self.events_path = self.events_path.trim().to_string();
        let mut origins: Vec<String> = std::mem::take(&mut self.cors_origins)
            .into_iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        origins.sort();
        origins.dedup();
        self.cors_origins = origins;
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.events_path = resolve_path(base, &self.events_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.events_path.is_empty() {
            return Err(anyhow!("events_path must not be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than 0"));
        }
        if self.assessment_timeout_seconds == 0 {
            return Err(anyhow!("assessment_timeout_seconds must be greater than 0"));
        }
        validate_range(
            "assessment_max_attempts",
            u64::from(self.assessment_max_attempts),
            1,
            10,
        )?;
        if let Some(url) = &self.assessor_url {
            validate_http_url("assessor_url", url)?;
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            cors_origins: self.cors_origins.clone(),
            poll_interval_ms: self.poll_interval_ms,
            assessment_timeout_seconds: self.assessment_timeout_seconds,
            assessment_max_attempts: self.assessment_max_attempts,
            assessment_retry_backoff_ms: self.assessment_retry_backoff_ms,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_source_config(&self) -> SourceConfig {
        SourceConfig {
            events_path: self.events_path.clone(),
            follow_events: self.follow_events,
        }
    }

    pub fn to_assessor_config(&self) -> AssessorConfig {
        AssessorConfig {
            assessor_url: self.assessor_url.clone(),
            assessor_token: self.assessor_token.clone(),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("SENTINEL_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("SENTINEL_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Some(value) = lookup("SENTINEL_CORS_ORIGINS") {
            self.cors_origins = parse_env_list(&value);
        }
        if let Some(value) = lookup(EVENTS_PATH_ENV) {
            self.events_path = value;
        }
        if let Some(value) = lookup("SENTINEL_FOLLOW_EVENTS") {
            self.follow_events = parse_env_bool(&value).unwrap_or(self.follow_events);
        }
        if let Some(value) = lookup("SENTINEL_POLL_INTERVAL_MS") {
            self.poll_interval_ms = value.parse().unwrap_or(self.poll_interval_ms);
        }
        if let Some(value) = lookup("SENTINEL_ASSESSOR_URL") {
            self.assessor_url = Some(value);
        }
        if let Some(value) = lookup("SENTINEL_ASSESSOR_TOKEN") {
            self.assessor_token = Some(value);
        }
        if let Some(value) = lookup("SENTINEL_ASSESSMENT_TIMEOUT_SECONDS") {
            self.assessment_timeout_seconds =
                value.parse().unwrap_or(self.assessment_timeout_seconds);
        }
        if let Some(value) = lookup("SENTINEL_ASSESSMENT_MAX_ATTEMPTS") {
            self.assessment_max_attempts = value.parse().unwrap_or(self.assessment_max_attempts);
        }
        if let Some(value) = lookup("SENTINEL_ASSESSMENT_RETRY_BACKOFF_MS") {
            self.assessment_retry_backoff_ms =
                value.parse().unwrap_or(self.assessment_retry_backoff_ms);
        }
        if let Some(value) = lookup("SENTINEL_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("SENTINEL_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load_from(&dir.path().join("absent.toml"), no_env)
            .await
            .expect("config");
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.assessment_max_attempts, 2);
        assert!(config.follow_events);
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.assessor_url.is_none());
    }

    #[tokio::test]
    async fn file_values_resolve_relative_to_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "events_path = \"logins.jsonl\"\napi_token = \"  \"\nassessor_url = \"https://risk.internal/assess\"\n",
        )
        .expect("write");

        let config = AppConfig::load_from(&path, no_env).await.expect("config");

        assert_eq!(
            Path::new(&config.events_path),
            dir.path().join("logins.jsonl").as_path()
        );
        assert!(config.api_token.is_none());
        assert_eq!(
            config.to_assessor_config().assessor_url.as_deref(),
            Some("https://risk.internal/assess")
        );
    }

    #[tokio::test]
    async fn env_overrides_win_over_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = 900\nfollow_events = true\n").expect("write");
        let env = HashMap::from([
            ("SENTINEL_POLL_INTERVAL_MS", "50"),
            ("SENTINEL_FOLLOW_EVENTS", "false"),
            ("SENTINEL_CORS_ORIGINS", "https://ops.example.com/, https://ops.example.com"),
            (EVENTS_PATH_ENV, "/data/events.jsonl"),
        ]);

        let config = AppConfig::load_from(&path, |key| env.get(key).map(|v| v.to_string()))
            .await
            .expect("config");

        assert_eq!(config.poll_interval_ms, 50);
        assert!(!config.follow_events);
        assert_eq!(config.cors_origins, vec!["https://ops.example.com".to_string()]);
        assert_eq!(config.to_source_config().events_path, "/data/events.jsonl");
    }

    #[test]
    fn rejects_out_of_range_attempts_and_bad_urls() {
        let mut config = AppConfig {
            assessment_max_attempts: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        config.assessment_max_attempts = 3;
        config.assessor_url = Some("ftp://risk.internal".to_string());
        assert!(config.validate().is_err());
        config.assessor_url = Some("http://exa mple.com/assess".to_string());
        assert!(config.validate().is_err());
        config.assessor_url = Some("http://127.0.0.1:9000/assess".to_string());
        assert!(config.validate().is_ok());

        config.assessor_url = None;
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }
}
