use crate::config::types::{
    BrowserConfig, Config, OutputConfig, RetryConfig, SchedulerConfig, SiteAlias,
};
use crate::sites::SiteId;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_browser_config(&config.browser)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_site_aliases(&config.site_alias)?;
    Ok(())
}

/// Validates rendering session settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    for (name, value) in [
        ("navigation-timeout-ms", config.navigation_timeout_ms),
        ("listing-ready-timeout-ms", config.listing_ready_timeout_ms),
        ("detail-ready-timeout-ms", config.detail_ready_timeout_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    if config.scroll_step_px == 0 {
        return Err(ConfigError::Validation(
            "scroll-step-px must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry settings
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.store_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_scrapes < 1 || config.max_concurrent_scrapes > 16 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-scrapes must be between 1 and 16, got {}",
            config.max_concurrent_scrapes
        )));
    }

    Ok(())
}

/// Validates site alias entries
fn validate_site_aliases(aliases: &[SiteAlias]) -> Result<(), ConfigError> {
    for alias in aliases {
        validate_domain_pattern(&alias.domain)?;

        if SiteId::from_name(&alias.site).is_none() {
            return Err(ConfigError::UnknownSite(alias.site.clone()));
        }
    }

    Ok(())
}

/// Validates a host pattern (supports a leading `*.` wildcard)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
