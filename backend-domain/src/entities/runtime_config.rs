// Runtime configuration shared by the application and HTTP layers

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub cors_origins: Vec<String>,
    pub poll_interval_ms: u64,
    pub assessment_timeout_seconds: u64,
    pub assessment_max_attempts: u32,
    pub assessment_retry_backoff_ms: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            api_token: None,
            cors_origins: Vec::new(),
            poll_interval_ms: 500,
            assessment_timeout_seconds: 10,
            assessment_max_attempts: 2,
            assessment_retry_backoff_ms: 250,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub events_path: String,
    pub follow_events: bool,
}

#[derive(Debug, Clone)]
pub struct AssessorConfig {
    pub assessor_url: Option<String>,
    pub assessor_token: Option<String>,
}
