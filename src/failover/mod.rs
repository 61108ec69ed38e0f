//! Failover subsystem.
//!
//! # Data Flow
//! ```text
//! caller → FailoverClient::execute(op, mode)
//!     → Simple:        registry order
//!     → HealthChecked: HealthRanker::rank once, ranked order
//!     → per endpoint:  RetryExecutor (timeout-bounded attempts, backoff)
//!     → first success returns; exhaustion moves to the next endpoint
//!     → OperationOutcome { value, attempts }
//! ```

pub mod client;
pub mod operation;
pub mod outcome;

pub use client::FailoverClient;
pub use operation::{operation, FnOperation, LogicalOperation};
pub use outcome::{AttemptRecord, AttemptTrail, FailoverError, Mode, OperationOutcome};
