//! Concurrent probing and ranking of endpoints.
//!
//! # Ordering
//! ```text
//! healthy endpoints:   priority ascending, then latency ascending
//! failed endpoints:    appended after, in the order they were given
//! ```
//! Latency only breaks ties between equal priorities. A fast backup never
//! outranks a slower healthy endpoint the operator marked as preferred.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::endpoints::Endpoint;
use crate::health::probe::{ProbeResult, ProbeRunner};

/// Probes every endpoint at once and orders the results.
#[derive(Debug, Clone)]
pub struct HealthRanker {
    runner: ProbeRunner,
}

impl HealthRanker {
    pub fn new(runner: ProbeRunner) -> Self {
        Self { runner }
    }

    /// Probe all `endpoints` concurrently, each bounded by `timeout`, and rank them.
    ///
    /// The returned vector has one entry per input endpoint.
    pub async fn rank(&self, endpoints: &[Arc<Endpoint>], timeout: Duration) -> Vec<ProbeResult> {
        let probes = endpoints
            .iter()
            .map(|endpoint| self.runner.probe(endpoint.clone(), timeout));
        // join_all keeps input order
        let results = join_all(probes).await;

        let ranked = order_results(results);

        tracing::info!(
            ranking = ?ranked
                .iter()
                .map(|r| (r.endpoint.name.as_str(), r.success, r.latency_ms))
                .collect::<Vec<_>>(),
            "Endpoints ranked"
        );

        ranked
    }
}

/// Partition into successes and failures and sort the successes.
fn order_results(results: Vec<ProbeResult>) -> Vec<ProbeResult> {
    let (mut healthy, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.success);

    healthy.sort_by_key(|r| (r.endpoint.priority, r.latency_ms));
    healthy.extend(failed);
    healthy
}
