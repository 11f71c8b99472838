use crate::config::types::{
    ApiConfig, BrowserConfig, Config, CrawlerConfig, OutputConfig, StoreEntry,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

const MAX_DEPTH_LIMIT: u32 = 5;
const MAX_PAGE_LIMIT: u32 = 100;
const MAX_SETTLE_DELAY_MS: u64 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_api_config(&config.api)?;
    validate_output_config(&config.output)?;
    validate_stores(&config.stores)?;
    Ok(())
}

/// Validates traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 || config.max_depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-depth must be between 1 and {}, got {}",
            MAX_DEPTH_LIMIT, config.max_depth
        )));
    }

    for (key, value) in [
        ("per-page", config.per_page),
        ("offers-limit", config.offers_limit),
    ] {
        if value < 1 || value > MAX_PAGE_LIMIT {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                key, MAX_PAGE_LIMIT, value
            )));
        }
    }

    Ok(())
}

/// Validates page fetching configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.settle_delay_ms > MAX_SETTLE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "settle-delay-ms must be <= {}ms, got {}ms",
            MAX_SETTLE_DELAY_MS, config.settle_delay_ms
        )));
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be positive when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the catalog API location
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates store entries: at least one, unique ids and slugs
fn validate_stores(stores: &[StoreEntry]) -> Result<(), ConfigError> {
    if stores.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[store]] entry is required".to_string(),
        ));
    }

    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();

    for store in stores {
        validate_slug(&store.slug)?;

        if !ids.insert(store.id) {
            return Err(ConfigError::Validation(format!(
                "Duplicate store id {}",
                store.id
            )));
        }

        if !slugs.insert(store.slug.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate store slug '{}'",
                store.slug
            )));
        }
    }

    Ok(())
}

/// Slugs end up in log lines and run records: keep them plain
fn validate_slug(slug: &str) -> Result<(), ConfigError> {
    if slug.is_empty() {
        return Err(ConfigError::Validation(
            "Store slug cannot be empty".to_string(),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "Store slug '{}' must contain only ASCII letters, digits, '-' or '_'",
            slug
        )));
    }

    Ok(())
}
