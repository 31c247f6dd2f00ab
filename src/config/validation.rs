use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that the gateway credential is present, the endpoint and search
/// URL template are well-formed, and that concurrency and batching knobs
/// are non-zero.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.gateway.api_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "gateway.api-key must not be empty".to_string(),
        ));
    }

    if Url::parse(&config.gateway.endpoint).is_err() {
        return Err(ConfigError::Validation(format!(
            "gateway.endpoint is not a valid URL: {}",
            config.gateway.endpoint
        )));
    }

    if !config.site.search_url.contains("{term}") {
        return Err(ConfigError::Validation(
            "site.search-url must contain a {term} placeholder".to_string(),
        ));
    }

    if config.crawler.page_cap == 0 {
        return Err(ConfigError::Validation(
            "crawler.page-cap must be at least 1".to_string(),
        ));
    }

    if config.crawler.search_concurrency == 0 || config.crawler.detail_concurrency == 0 {
        return Err(ConfigError::Validation(
            "crawler concurrency values must be at least 1".to_string(),
        ));
    }

    if config.crawler.batch_threshold == 0 {
        return Err(ConfigError::Validation(
            "crawler.batch-threshold must be at least 1".to_string(),
        ));
    }

    if config.search.terms.is_empty() {
        return Err(ConfigError::Validation(
            "search.terms must contain at least one term".to_string(),
        ));
    }

    if config.search.terms.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search.terms must not contain blank terms".to_string(),
        ));
    }

    Ok(())
}
