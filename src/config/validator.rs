//! Configuration validation with aggregated errors.
//! Every problem is collected so a broken file is reported in one pass.

use tracing::{error, info};

use crate::config::settings::{ClientConfig, Endpoint, LoggingConfig};

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];
const ALLOWED_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate(cfg: &ClientConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    if !ALLOWED_SCHEMES.contains(&cfg.scheme.as_str()) {
        errors.push(format!(
            "config: scheme '{}' is not supported; allowed: {:?}",
            cfg.scheme, ALLOWED_SCHEMES
        ));
    }
    if cfg.host.trim().is_empty() {
        errors.push("config: 'host' must not be empty".to_string());
    }

    validate_endpoint("auth", &cfg.endpoints.auth, &mut errors);
    validate_endpoint("categories", &cfg.endpoints.categories, &mut errors);
    validate_endpoint("entry", &cfg.endpoints.entry, &mut errors);

    if cfg.max_attempts == 0 {
        errors.push("config: 'max_attempts' must be >= 1".to_string());
    }
    if cfg.backoff_unit_ms == 0 {
        errors.push("config: 'backoff_unit_ms' must be >= 1".to_string());
    }
    // the first rejection is what obtains the initial token
    if cfg.max_reauthentications == 0 {
        errors.push("config: 'max_reauthentications' must be >= 1".to_string());
    }

    validate_logging(&cfg.logging, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("{}", e);
        }
        Err(errors)
    }
}

fn validate_endpoint(name: &str, endpoint: &Endpoint, errors: &mut Vec<String>) {
    if !endpoint.path.starts_with('/') {
        errors.push(format!(
            "endpoints.{}: path '{}' must start with '/'",
            name, endpoint.path
        ));
    }
    if endpoint.path.contains('?') {
        errors.push(format!(
            "endpoints.{}: path '{}' must not carry a query",
            name, endpoint.path
        ));
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    if !ALLOWED_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "logging.level '{}' is invalid; allowed: {:?}",
            logging.level, ALLOWED_LEVELS
        ));
    }
}
