//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probes, attempts, failovers, calls
//!     → logging.rs (structured tracing events, one span per call)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr log stream
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every failover call carries a call_id on its span
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
