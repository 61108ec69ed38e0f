//! Endpoint registry subsystem.
//!
//! # Data Flow
//! ```text
//! RpcConfig.endpoints (TOML / env / built-in defaults)
//!     → config::schema::EndpointConfig::resolve (drop entries whose env URL is unset)
//!     → registry.rs (validate, stable sort by priority)
//!     → Arc<EndpointRegistry> shared with FailoverClient
//! ```
//!
//! # Design Decisions
//! - The registry is a value object: built once, never mutated
//! - Lower priority number = preferred endpoint
//! - Ties keep registration order (stable sort)

pub mod registry;

pub use registry::{ConfigurationError, Endpoint, EndpointRegistry};
