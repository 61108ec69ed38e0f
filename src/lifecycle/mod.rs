//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl+C / caller decision
//!     → shutdown.rs (sticky watch trigger)
//!     → every ShutdownSignal resolves
//!     → in-flight failover calls drop their network call and pending sleep
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};
