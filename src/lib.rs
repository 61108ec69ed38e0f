//! Resilient multi-endpoint ledger RPC client.
//!
//! Talks to several untrusted, rate-limited RPC endpoints and turns them into
//! one reliable read: endpoints are ordered by operator priority (optionally
//! after a concurrent health probe), each endpoint is retried with capped
//! exponential backoff, and the call fails over to the next endpoint until one
//! answers or all are exhausted.

pub mod blockchain;
pub mod config;
pub mod endpoints;
pub mod failover;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::RpcConfig;
pub use endpoints::{Endpoint, EndpointRegistry};
pub use failover::{FailoverClient, FailoverError, LogicalOperation, Mode, OperationOutcome};
pub use lifecycle::Shutdown;
