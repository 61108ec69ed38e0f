//! Single-endpoint liveness/latency probe.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use async_trait::async_trait;
use thiserror::Error;

use crate::blockchain::types::RpcResult;
use crate::endpoints::Endpoint;
use crate::observability::metrics;

/// Lightweight liveness request, e.g. "fetch current slot".
///
/// Implementations perform exactly one request and never retry.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, endpoint: &Endpoint) -> RpcResult<()>;
}

/// Why a probe failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Probe did not finish within its deadline.
    #[error("timeout")]
    Timeout,

    /// Transport or RPC failure.
    #[error("{0}")]
    Transport(String),
}

/// Outcome of probing one endpoint once.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub endpoint: Arc<Endpoint>,
    pub success: bool,
    /// Round-trip time. Zero unless `success`.
    pub latency_ms: u64,
    pub error_detail: Option<String>,
}

impl ProbeResult {
    pub fn healthy(endpoint: Arc<Endpoint>, latency_ms: u64) -> Self {
        Self {
            endpoint,
            success: true,
            latency_ms,
            error_detail: None,
        }
    }

    pub fn failed(endpoint: Arc<Endpoint>, error: ProbeError) -> Self {
        Self {
            endpoint,
            success: false,
            latency_ms: 0,
            error_detail: Some(error.to_string()),
        }
    }
}

/// Runs a [`Probe`] under a hard deadline.
#[derive(Clone)]
pub struct ProbeRunner {
    probe: Arc<dyn Probe>,
}

impl ProbeRunner {
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self { probe }
    }

    /// Probe `endpoint` once. Never fails; failure is recorded in the result.
    pub async fn probe(&self, endpoint: Arc<Endpoint>, timeout: Duration) -> ProbeResult {
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, self.probe.check(&endpoint)).await {
            Ok(Ok(())) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                tracing::debug!(endpoint = %endpoint.name, latency_ms, "Probe succeeded");
                ProbeResult::healthy(endpoint, latency_ms)
            }
            Ok(Err(e)) => {
                tracing::warn!(endpoint = %endpoint.name, error = %e, "Probe failed");
                ProbeResult::failed(endpoint, ProbeError::Transport(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    endpoint = %endpoint.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Probe failed: timeout"
                );
                ProbeResult::failed(endpoint, ProbeError::Timeout)
            }
        };

        metrics::record_probe(&result.endpoint.name, result.success, result.latency_ms);
        result
    }
}

impl std::fmt::Debug for ProbeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRunner").finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, ScriptedProbe};
    use super::*;

    fn endpoint(name: &str) -> Arc<Endpoint> {
        Arc::new(Endpoint::new(name, format!("http://{}", name), 1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_success_records_latency() {
        let runner = ProbeRunner::new(Arc::new(ScriptedProbe::new(&[("a", Scripted::Ok(20))])));
        let result = runner.probe(endpoint("a"), Duration::from_secs(1)).await;
        assert!(result.success);
        assert_eq!(result.latency_ms, 20);
        assert!(result.error_detail.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeout() {
        let runner = ProbeRunner::new(Arc::new(ScriptedProbe::new(&[("a", Scripted::Hang)])));
        let result = runner.probe(endpoint("a"), Duration::from_millis(30)).await;
        assert!(!result.success);
        assert_eq!(result.latency_ms, 0);
        assert_eq!(result.error_detail.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_probe_transport_error() {
        let runner = ProbeRunner::new(Arc::new(ScriptedProbe::new(&[("a", Scripted::Fail)])));
        let result = runner.probe(endpoint("a"), Duration::from_secs(1)).await;
        assert!(!result.success);
        assert_eq!(result.error_detail.as_deref(), Some("HTTP status 503"));
    }
}
