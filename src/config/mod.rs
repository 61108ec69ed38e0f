//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, all errors at once)
//!     → RpcConfig (validated, immutable)
//!     → EndpointRegistry / RetryPolicy built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Premium endpoints read their URL from the environment and are optional

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    EndpointConfig, HealthCheckConfig, ObservabilityConfig, RetryConfig, RpcConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
