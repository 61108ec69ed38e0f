//! Ordered, immutable set of candidate RPC endpoints.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::RpcConfig;

/// A named, prioritized remote ledger endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Unique human-readable name (e.g. "helius").
    pub name: String,
    /// Connection target. Opaque to the resilience layer.
    pub url: String,
    /// Lower = preferred.
    pub priority: u32,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            priority,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (p{})", self.name, self.priority)
    }
}

/// Errors raised while assembling the resilience layer at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No endpoint survived configuration.
    #[error("endpoint registry is empty; at least one endpoint must be configured")]
    EmptyRegistry,

    /// Two endpoints share a name.
    #[error("duplicate endpoint name '{0}'")]
    DuplicateEndpoint(String),

    /// Endpoint URL does not parse.
    #[error("endpoint '{name}' has invalid URL: {reason}")]
    InvalidUrl { name: String, reason: String },

    /// Retry policy bounds are inconsistent.
    #[error("invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
}

/// Endpoints sorted ascending by priority, ties in registration order.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: Vec<Arc<Endpoint>>,
}

impl EndpointRegistry {
    /// Build a registry. Fails if `endpoints` is empty or names collide.
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self, ConfigurationError> {
        if endpoints.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for endpoint in &endpoints {
            if !seen.insert(endpoint.name.as_str()) {
                return Err(ConfigurationError::DuplicateEndpoint(endpoint.name.clone()));
            }
        }

        let mut endpoints: Vec<Arc<Endpoint>> = endpoints.into_iter().map(Arc::new).collect();
        // sort_by_key is stable
        endpoints.sort_by_key(|e| e.priority);

        tracing::debug!(
            count = endpoints.len(),
            order = ?endpoints.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            "Endpoint registry built"
        );

        Ok(Self { endpoints })
    }

    /// Build from configuration, resolving env-driven URLs.
    ///
    /// Missing optional endpoints shrink the registry; only an empty result fails.
    pub fn from_config(config: &RpcConfig) -> Result<Self, ConfigurationError> {
        let endpoints = config.resolved_endpoints();
        for endpoint in &endpoints {
            url::Url::parse(&endpoint.url).map_err(|e| ConfigurationError::InvalidUrl {
                name: endpoint.name.clone(),
                reason: e.to_string(),
            })?;
        }
        Self::new(endpoints)
    }

    /// Endpoints in preference order.
    pub fn list(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Look up an endpoint by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Endpoint>> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    /// Whether `endpoint` is a member of this registry.
    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.endpoints.iter().any(|e| e.as_ref() == endpoint)
    }
}
