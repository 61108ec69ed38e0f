//! Failover client: the single entry point for resilient ledger reads.
//!
//! # Responsibilities
//! - Resolve the endpoint order for a call (registry order or fresh ranking)
//! - Run the operation against one endpoint at a time under the retry policy
//! - Fail over to the next endpoint once an endpoint's retries are spent
//! - Return the value plus the full attempt trail
//!
//! # Design Decisions
//! - Endpoints are never raced within one call; reads may hit paid or
//!   rate-limited providers and writes must not be duplicated
//! - Ranking happens at most once per call, never mid-iteration
//! - Individual endpoint failures never abort the call early

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::types::RpcError;
use crate::config::RpcConfig;
use crate::endpoints::{ConfigurationError, Endpoint, EndpointRegistry};
use crate::failover::operation::LogicalOperation;
use crate::failover::outcome::{AttemptRecord, AttemptTrail, FailoverError, Mode, OperationOutcome};
use crate::health::{HealthRanker, Probe, ProbeResult, ProbeRunner};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::resilience::{RetryExecutor, RetryPolicy};

/// Default probe deadline.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// Default per-attempt deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Multi-endpoint client with retries and failover.
#[derive(Debug, Clone)]
pub struct FailoverClient {
    registry: Arc<EndpointRegistry>,
    executor: RetryExecutor,
    ranker: HealthRanker,
    probe_timeout: Duration,
    request_timeout: Duration,
}

impl FailoverClient {
    /// Create a client. Fails if the registry has no endpoints.
    pub fn new(
        registry: Arc<EndpointRegistry>,
        policy: RetryPolicy,
        ranker: HealthRanker,
    ) -> Result<Self, ConfigurationError> {
        if registry.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }

        Ok(Self {
            registry,
            executor: RetryExecutor::new(policy),
            ranker,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Build a client from validated configuration and a ledger probe.
    pub fn from_config(
        config: &RpcConfig,
        registry: Arc<EndpointRegistry>,
        probe: Arc<dyn Probe>,
    ) -> Result<Self, ConfigurationError> {
        let policy = RetryPolicy::from_config(&config.retries)?;
        let ranker = HealthRanker::new(ProbeRunner::new(probe));

        Ok(Self::new(registry, policy, ranker)?
            .with_probe_timeout(Duration::from_millis(config.health_check.probe_timeout_ms))
            .with_request_timeout(Duration::from_millis(config.timeouts.request_ms)))
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }

    /// Probe and rank every registered endpoint.
    pub async fn rank(&self) -> Vec<ProbeResult> {
        self.ranker.rank(self.registry.list(), self.probe_timeout).await
    }

    /// Run `op` with retries and failover.
    ///
    /// Never fails outright: an outcome without a value carries the trail of
    /// every endpoint that was tried.
    pub async fn execute<O>(&self, op: &O, mode: Mode) -> OperationOutcome<O::Output>
    where
        O: LogicalOperation,
    {
        let span = tracing::info_span!(
            "failover",
            call_id = %Uuid::new_v4(),
            operation = op.name(),
            mode = ?mode
        );
        self.run(op, mode).instrument(span).await
    }

    /// Run `op` and flatten the outcome into a `Result`.
    pub async fn call<O>(&self, op: &O, mode: Mode) -> Result<O::Output, FailoverError>
    where
        O: LogicalOperation,
    {
        self.execute(op, mode).await.into_result()
    }

    /// Like [`execute`](Self::execute), but abandons the call when `shutdown` fires.
    ///
    /// Cancellation drops the in-flight request and any pending backoff sleep.
    pub async fn execute_until<O>(
        &self,
        op: &O,
        mode: Mode,
        shutdown: &mut ShutdownSignal,
    ) -> Result<OperationOutcome<O::Output>, FailoverError>
    where
        O: LogicalOperation,
    {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::warn!(operation = op.name(), "Call cancelled");
                metrics::record_call(op.name(), "cancelled", None);
                Err(FailoverError::Cancelled)
            }
            outcome = self.execute(op, mode) => Ok(outcome),
        }
    }

    async fn run<O>(&self, op: &O, mode: Mode) -> OperationOutcome<O::Output>
    where
        O: LogicalOperation,
    {
        let started = Instant::now();
        let candidates = self.candidates(mode).await;
        let mut trail = Vec::with_capacity(candidates.len());

        for (index, endpoint) in candidates.into_iter().enumerate() {
            if index > 0 {
                metrics::record_failover(op.name());
            }

            let mut attempts = 0;
            let result = self
                .executor
                .execute_when(
                    |attempt| {
                        attempts = attempt;
                        self.attempt(op, endpoint.clone(), attempt)
                    },
                    RpcError::is_retryable,
                )
                .await;

            if attempts > 1 {
                metrics::record_retries(op.name(), attempts - 1);
            }

            match result {
                Ok(value) => {
                    tracing::info!(
                        endpoint = %endpoint.name,
                        attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Call succeeded"
                    );
                    trail.push(AttemptRecord {
                        endpoint,
                        succeeded: true,
                        attempts,
                        error: None,
                    });
                    metrics::record_call(op.name(), "success", Some(started));
                    return OperationOutcome {
                        value: Some(value),
                        attempts: AttemptTrail(trail),
                    };
                }
                Err(exhausted) => {
                    tracing::warn!(
                        endpoint = %endpoint.name,
                        attempts = exhausted.attempts,
                        error = %exhausted.last_error,
                        "Endpoint exhausted, failing over"
                    );
                    trail.push(AttemptRecord {
                        endpoint,
                        succeeded: false,
                        attempts: exhausted.attempts,
                        error: Some(exhausted.last_error.to_string()),
                    });
                }
            }
        }

        tracing::error!(tried = trail.len(), "All endpoints failed");
        metrics::record_call(op.name(), "failure", Some(started));
        OperationOutcome {
            value: None,
            attempts: AttemptTrail(trail),
        }
    }

    /// Endpoint order for one call.
    async fn candidates(&self, mode: Mode) -> Vec<Arc<Endpoint>> {
        match mode {
            Mode::Simple => self.registry.list().to_vec(),
            Mode::HealthChecked => self
                .rank()
                .await
                .into_iter()
                .map(|result| result.endpoint)
                .collect(),
        }
    }

    /// One deadline-bounded attempt against one endpoint.
    async fn attempt<O>(
        &self,
        op: &O,
        endpoint: Arc<Endpoint>,
        attempt: u32,
    ) -> Result<O::Output, RpcError>
    where
        O: LogicalOperation,
    {
        let name = endpoint.name.clone();
        let result = with_timeout(self.request_timeout, op.run_against(endpoint)).await;

        match &result {
            Ok(_) => tracing::debug!(endpoint = %name, attempt, "Attempt succeeded"),
            Err(e) => tracing::debug!(endpoint = %name, attempt, error = %e, "Attempt failed"),
        }
        metrics::record_attempt(&name, op.name(), result.is_ok());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failover::operation::operation;
    use crate::health::probe::testing::{Scripted, ScriptedProbe};
    use crate::lifecycle::Shutdown;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn registry(entries: &[(&str, u32)]) -> Arc<EndpointRegistry> {
        Arc::new(
            EndpointRegistry::new(
                entries.iter()
                    .map(|(n, p)| Endpoint::new(*n, format!("http://{}", n), *p))
                    .collect(),
            )
            .unwrap(),
        )
    }

    fn client(entries: &[(&str, u32)], probes: &[(&str, Scripted)], policy: RetryPolicy) -> FailoverClient {
        counted_client(entries, probes, policy).0
    }

    /// Client plus a handle on its probe for counting checks.
    fn counted_client(
        entries: &[(&str, u32)],
        probes: &[(&str, Scripted)],
        policy: RetryPolicy,
    ) -> (FailoverClient, Arc<ScriptedProbe>) {
        let probe = Arc::new(ScriptedProbe::new(probes));
        let ranker = HealthRanker::new(ProbeRunner::new(probe.clone()));
        let client = FailoverClient::new(registry(entries), policy, ranker)
            .unwrap()
            .with_probe_timeout(Duration::from_millis(200));
        (client, probe)
    }

    /// Records every endpoint hit and answers from a per-endpoint script.
    struct Recorder {
        hits: Mutex<Vec<String>>,
        answers: HashMap<String, Result<u64, RpcError>>,
    }

    impl Recorder {
        fn new(answers: &[(&str, Result<u64, RpcError>)]) -> Arc<Self> {
            Arc::new(Self {
                hits: Mutex::new(Vec::new()),
                answers: answers
                    .iter()
                    .map(|(n, a)| (n.to_string(), a.clone()))
                    .collect(),
            })
        }

        fn hits(&self) -> Vec<String> {
            self.hits.lock().unwrap().clone()
        }
    }

    fn recorded(recorder: &Arc<Recorder>) -> impl LogicalOperation<Output = u64> {
        let recorder = recorder.clone();
        operation("getBalance", move |endpoint: Arc<Endpoint>| {
            let recorder = recorder.clone();
            async move {
                recorder.hits.lock().unwrap().push(endpoint.name.clone());
                recorder
                    .answers
                    .get(&endpoint.name)
                    .cloned()
                    .unwrap_or(Err(RpcError::Status(503)))
            }
        })
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, 10, 100).unwrap()
    }

    #[test]
    fn test_client_requires_endpoints() {
        // An empty registry cannot be built in the first place.
        assert_eq!(
            EndpointRegistry::new(Vec::new()).unwrap_err(),
            ConfigurationError::EmptyRegistry
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_simple_mode_walks_priority_order() {
        let client = client(&[("c", 3), ("a", 1), ("b", 2), ("b2", 2)], &[], policy(2));
        let recorder = Recorder::new(&[("c", Ok(42))]);

        let outcome = client.execute(&recorded(&recorder), Mode::Simple).await;

        assert_eq!(outcome.value, Some(42));
        assert_eq!(outcome.attempts.endpoint_names(), vec!["a", "b", "b2", "c"]);
        assert_eq!(
            recorder.hits(),
            vec!["a", "a", "b", "b", "b2", "b2", "c"]
        );
        let last = outcome.attempts.iter().last().unwrap();
        assert!(last.succeeded);
        assert_eq!(last.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_balance_is_success() {
        let client = client(&[("a", 1), ("b", 2)], &[], policy(3));
        let recorder = Recorder::new(&[("a", Ok(0))]);

        let outcome = client.execute(&recorded(&recorder), Mode::Simple).await;

        assert!(outcome.success());
        assert_eq!(outcome.value, Some(0));
        assert_eq!(recorder.hits(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_endpoints_failed() {
        let client = client(&[("a", 1), ("b", 2)], &[], policy(3));
        let recorder = Recorder::new(&[("b", Err(RpcError::RateLimited))]);

        let outcome = client.execute(&recorded(&recorder), Mode::Simple).await;
        assert!(!outcome.success());
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(recorder.hits().len(), 6);

        let err = outcome.into_result().unwrap_err();
        match err {
            FailoverError::AllEndpointsFailed { trail } => {
                let errors: Vec<_> = trail.iter().map(|r| r.error.clone().unwrap()).collect();
                assert_eq!(errors, vec!["HTTP status 503", "rate limited"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_skips_remaining_attempts() {
        let client = client(&[("a", 1), ("b", 2)], &[], policy(5));
        let recorder = Recorder::new(&[
            ("a", Err(RpcError::InvalidInput("bad address".into()))),
            ("b", Ok(7)),
        ]);

        let outcome = client.execute(&recorded(&recorder), Mode::Simple).await;
        assert_eq!(outcome.value, Some(7));
        assert_eq!(recorder.hits(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_checked_priority_over_latency() {
        let client = client(
            &[("helius", 1), ("alchemy", 2), ("public", 3)],
            &[
                ("helius", Scripted::Hang),
                ("alchemy", Scripted::Ok(80)),
                ("public", Scripted::Ok(20)),
            ],
            policy(3),
        );
        let recorder = Recorder::new(&[("public", Ok(1_000_000))]);

        let outcome = client.execute(&recorded(&recorder), Mode::HealthChecked).await;

        assert!(outcome.success());
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.attempts.endpoint_names(), vec!["alchemy", "public"]);
        assert_eq!(recorder.hits(), vec!["alchemy", "alchemy", "alchemy", "public"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_checked_all_probes_failed() {
        let client = client(&[("a", 1), ("b", 2)], &[], policy(1));
        let recorder = Recorder::new(&[]);

        let result = client.call(&recorded(&recorder), Mode::HealthChecked).await;

        assert!(matches!(result, Err(FailoverError::AllEndpointsFailed { .. })));
        // Failed probes keep registry order and stay candidates.
        assert_eq!(recorder.hits(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout_counts_as_failure() {
        let client = client(&[("slow", 1), ("fast", 2)], &[], policy(2))
            .with_request_timeout(Duration::from_millis(100));
        let op = operation("getSlot", |endpoint: Arc<Endpoint>| async move {
            if endpoint.name == "slow" {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok::<u64, RpcError>(99)
        });

        let outcome = client.execute(&op, Mode::Simple).await;
        assert_eq!(outcome.value, Some(99));
        assert_eq!(
            outcome.attempts.0[0].error.as_deref(),
            Some("RPC timeout after 100 ms")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_retry_loop() {
        let client = client(&[("a", 1)], &[], RetryPolicy::new(10, 1000, 1000).unwrap());
        let recorder = Recorder::new(&[]);
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();

        let op = recorded(&recorder);
        let call = client.execute_until(&op, Mode::Simple, &mut signal);
        let trigger = async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            shutdown.trigger();
        };
        let (result, ()) = tokio::join!(call, trigger);

        assert_eq!(result.unwrap_err(), FailoverError::Cancelled);
        let hits = recorder.hits().len();
        assert_eq!(hits, 3);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(recorder.hits().len(), hits);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_call_makes_no_attempts() {
        let client = client(&[("a", 1)], &[], RetryPolicy::new(5, 1000, 1000).unwrap());
        let recorder = Recorder::new(&[]);
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut signal = shutdown.subscribe();

        let started = tokio::time::Instant::now();
        let result = client
            .execute_until(&recorded(&recorder), Mode::Simple, &mut signal)
            .await;

        assert_eq!(result.unwrap_err(), FailoverError::Cancelled);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(recorder.hits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_checked_ranks_once_per_call() {
        let (client, probe) = counted_client(
            &[("helius", 1), ("alchemy", 2), ("public", 3)],
            &[
                ("helius", Scripted::Ok(30)),
                ("alchemy", Scripted::Ok(10)),
                ("public", Scripted::Ok(5)),
            ],
            policy(2),
        );
        let recorder = Recorder::new(&[("public", Ok(5))]);

        let outcome = client.execute(&recorded(&recorder), Mode::HealthChecked).await;

        assert_eq!(outcome.attempts.endpoint_names(), vec!["helius", "alchemy", "public"]);
        assert_eq!(probe.calls(), 3);

        client.execute(&recorded(&recorder), Mode::HealthChecked).await;
        assert_eq!(probe.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simple_mode_never_probes() {
        let (client, probe) = counted_client(&[("a", 1), ("b", 2)], &[], policy(2));
        let recorder = Recorder::new(&[("b", Ok(1))]);

        let outcome = client.execute(&recorded(&recorder), Mode::Simple).await;

        assert_eq!(outcome.value, Some(1));
        assert_eq!(probe.calls(), 0);
    }
}
