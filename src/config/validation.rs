//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint names unique, URLs parseable, at least one endpoint resolvable
//! - Retry bounds and timeouts sane
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RpcConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RpcConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no endpoint resolved; configure at least one endpoint with a URL")]
    NoEndpoints,

    #[error("duplicate endpoint name '{0}'")]
    DuplicateName(String),

    #[error("endpoint '{0}' has neither url nor url_env")]
    MissingUrl(String),

    #[error("endpoint '{name}' has invalid URL: {reason}")]
    InvalidUrl { name: String, reason: String },

    #[error("retries.{0}")]
    Retry(String),

    #[error("{0} must be greater than 0")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate against the process environment.
pub fn validate_config(config: &RpcConfig) -> Result<(), Vec<ValidationError>> {
    validate_config_with(config, |var| std::env::var(var).ok())
}

/// Validate with a custom environment lookup.
pub fn validate_config_with<F>(config: &RpcConfig, lookup: F) -> Result<(), Vec<ValidationError>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for endpoint in config.endpoint_configs() {
        if !names.insert(endpoint.name.clone()) {
            errors.push(ValidationError::DuplicateName(endpoint.name.clone()));
        }
        if endpoint.url.is_none() && endpoint.url_env.is_none() {
            errors.push(ValidationError::MissingUrl(endpoint.name.clone()));
        }
    }

    let resolved = config.resolved_endpoints_with(&lookup);
    if resolved.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }
    for endpoint in &resolved {
        if let Err(e) = url::Url::parse(&endpoint.url) {
            errors.push(ValidationError::InvalidUrl {
                name: endpoint.name.clone(),
                reason: e.to_string(),
            });
        }
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::Retry("max_attempts must be at least 1".into()));
    }
    if retries.base_delay_ms == 0 {
        errors.push(ValidationError::Retry("base_delay_ms must be greater than 0".into()));
    }
    if retries.max_delay_ms < retries.base_delay_ms {
        errors.push(ValidationError::Retry(
            "max_delay_ms must be >= base_delay_ms".into(),
        ));
    }

    if config.health_check.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("health_check.probe_timeout_ms"));
    }
    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_ms"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
