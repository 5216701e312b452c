use crate::config::types::{
    CrawlerConfig, EndpointConfig, HarvestConfig, OutputConfig, RequestConfig, RetryConfig,
};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_endpoint_config(&config.endpoints)?;
    validate_request_config(&config.request)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl bounds and page size
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.start_index > 0 && config.end_index > 0 && config.start_index > config.end_index {
        return Err(ConfigError::Validation(format!(
            "start_index ({}) must not exceed end_index ({})",
            config.start_index, config.end_index
        )));
    }

    Ok(())
}

/// Validates retry settings
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if !config.growth_rate.is_finite() || config.growth_rate < 0.0 {
        return Err(ConfigError::Validation(format!(
            "growth_rate must be a finite, non-negative number, got {}",
            config.growth_rate
        )));
    }

    Ok(())
}

/// Validates endpoint URLs
fn validate_endpoint_config(config: &EndpointConfig) -> Result<(), ConfigError> {
    validate_http_url("base_url", &config.base_url)?;
    validate_http_url("referer", &config.referer)?;

    // Item links are appended verbatim, so the prefix must end at a path boundary
    if !config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base_url must end with '/', got '{}'",
            config.base_url
        )));
    }

    if config.count_path.is_empty() || config.list_path.is_empty() {
        return Err(ConfigError::Validation(
            "count_path and list_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the header and proxy pools
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    for agent in &config.user_agents {
        if agent.trim().is_empty() || HeaderValue::from_str(agent).is_err() {
            return Err(ConfigError::Validation(format!(
                "user agent '{}' is not a valid header value",
                agent
            )));
        }
    }

    for proxy in &config.proxies {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    Ok(())
}

/// Validates output locations
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    if config.table_file.is_empty() || config.progress_file.is_empty() {
        return Err(ConfigError::Validation(
            "table_file and progress_file cannot be empty".to_string(),
        ));
    }

    if config.table_file == config.progress_file {
        return Err(ConfigError::Validation(
            "table_file and progress_file must differ".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    Ok(())
}
