//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::blockchain::types::Chain;
use crate::config::defaults::default_endpoints;
use crate::endpoints::Endpoint;
use crate::failover::Mode;

/// Root configuration for the RPC resilience layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RpcConfig {
    /// Ledger family the endpoints serve.
    pub chain: Chain,

    /// Candidate endpoints. Empty means the built-in defaults for `chain`.
    pub endpoints: Vec<EndpointConfig>,

    /// Per-endpoint retry policy.
    pub retries: RetryConfig,

    /// Probing and endpoint selection.
    pub health_check: HealthCheckConfig,

    /// Per-attempt deadlines.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RpcConfig {
    /// Endpoint descriptors in effect: configured ones, or the chain defaults.
    pub fn endpoint_configs(&self) -> Vec<EndpointConfig> {
        if self.endpoints.is_empty() {
            default_endpoints(self.chain)
        } else {
            self.endpoints.clone()
        }
    }

    /// Endpoints that resolve against the process environment.
    pub fn resolved_endpoints(&self) -> Vec<Endpoint> {
        self.resolved_endpoints_with(|var| std::env::var(var).ok())
    }

    /// Endpoints that resolve against `lookup`. Entries whose URL is missing are skipped.
    pub fn resolved_endpoints_with<F>(&self, lookup: F) -> Vec<Endpoint>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.endpoint_configs()
            .iter()
            .filter_map(|e| e.resolve_with(&lookup))
            .collect()
    }
}

/// A single endpoint descriptor.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Unique endpoint identifier.
    pub name: String,

    /// Literal URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Environment variable holding the URL (e.g. a keyed premium endpoint).
    /// Takes precedence over `url`. Unset means the entry is skipped.
    #[serde(default)]
    pub url_env: Option<String>,

    /// Lower = preferred.
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Whether this endpoint is used at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_priority() -> u32 {
    10
}

fn default_enabled() -> bool {
    true
}

impl EndpointConfig {
    /// Endpoint with a literal URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
            url_env: None,
            priority,
            enabled: true,
        }
    }

    /// Endpoint whose URL comes from an environment variable.
    pub fn from_env(name: impl Into<String>, var: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            url: None,
            url_env: Some(var.into()),
            priority,
            enabled: true,
        }
    }

    /// Resolve to an [`Endpoint`], or `None` if disabled or without a URL.
    pub fn resolve_with<F>(&self, lookup: F) -> Option<Endpoint>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.enabled {
            return None;
        }

        let from_env = self
            .url_env
            .as_deref()
            .and_then(|var| lookup(var))
            .filter(|v| !v.trim().is_empty());

        let url = match (&self.url_env, from_env) {
            (_, Some(url)) => url,
            (Some(var), None) => {
                tracing::debug!(endpoint = %self.name, var = %var, "Endpoint URL variable unset, skipping");
                return None;
            }
            (None, None) => self.url.clone()?,
        };

        Some(Endpoint::new(self.name.clone(), url.trim(), self.priority))
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per endpoint, first try included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Add 0 to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 5000,
            jitter: false,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Default selection mode for calls.
    pub mode: Mode,

    /// Probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Simple,
            probe_timeout_ms: 3000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a single attempt against a single endpoint, in milliseconds.
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 10_000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
