use anyhow::{anyhow, Result};
use reqwest::Url;

pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value.trim())
        .map_err(|err| anyhow!("{} is not a valid url: {}", field, err))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("{} must use http or https, got {}", field, url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(anyhow!("{} has no host", field));
    }
    Ok(())
}

pub fn validate_range(field: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        return Err(anyhow!("{} must be between {} and {}, got {}", field, min, max, value));
    }
    Ok(())
}
