//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! HealthChecked failover call:
//!     → ranker.rs (probe every endpoint concurrently)
//!     → probe.rs (one bounded-timeout request per endpoint)
//!     → ranked Vec<ProbeResult>, used once for that call
//! ```
//!
//! # Design Decisions
//! - No cached "best endpoint"; each call ranks afresh
//! - A probe is never retried; a failed endpoint is re-probed next time
//! - Probe results carry their error detail for diagnostics

pub mod probe;
pub mod ranker;

pub use probe::{Probe, ProbeError, ProbeResult, ProbeRunner};
pub use ranker::HealthRanker;
