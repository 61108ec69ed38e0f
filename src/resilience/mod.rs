//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Logical operation against one endpoint:
//!     → timeouts.rs (per-attempt deadline)
//!     → On failure: retries.rs (retry with backoff.rs delays)
//!     → Budget spent: ExhaustedRetriesError back to the failover client
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Backoff is exponential and capped; jitter is opt-in
//! - Sleeping never happens while a lock is held

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{ExhaustedRetriesError, RetryExecutor, RetryPolicy};
