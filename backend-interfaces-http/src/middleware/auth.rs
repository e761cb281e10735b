use axum::http::{header, HeaderMap};

use backend_domain::RuntimeConfig;

/// Without a configured token every request is allowed.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    match &config.api_token {
        Some(api_token) => extract_bearer(headers)
            .map(|token| token == api_token.as_str())
            .unwrap_or(false),
        None => true,
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn open_when_no_token_configured() {
        assert!(authorize(&RuntimeConfig::default(), &HeaderMap::new()));
    }

    #[test]
    fn requires_matching_bearer_token() {
        let config = RuntimeConfig {
            api_token: Some("s3cret".to_string()),
            ..RuntimeConfig::default()
        };
        assert!(authorize(&config, &headers("Bearer s3cret")));
        assert!(!authorize(&config, &headers("Bearer wrong")));
        assert!(!authorize(&config, &headers("Basic s3cret")));
        assert!(!authorize(&config, &headers("Bearer ")));
        assert!(!authorize(&config, &HeaderMap::new()));
    }
}
