//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ledger family served by the configured endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Solana,
    Evm,
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Solana => write!(f, "solana"),
            Chain::Evm => write!(f, "evm"),
        }
    }
}

/// Errors from a single remote call against a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Connection or request failed below HTTP.
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Endpoint is throttling us (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Call exceeded its deadline.
    #[error("RPC timeout after {0} ms")]
    Timeout(u64),

    /// Caller-supplied argument is malformed; no endpoint can serve it.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RpcError {
    /// Whether retrying the same call against the same endpoint can help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RpcError::InvalidInput(_))
    }
}

/// Result type for single-endpoint RPC calls.
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            chain: Chain,
        }
        let w: Wrapper = toml::from_str("chain = \"evm\"").unwrap();
        assert_eq!(w.chain, Chain::Evm);
        assert_eq!(Chain::default(), Chain::Solana);
        assert_eq!(Chain::Solana.to_string(), "solana");
    }

    #[test]
    fn test_error_display() {
        let err = RpcError::Timeout(1500);
        assert_eq!(err.to_string(), "RPC timeout after 1500 ms");

        let err = RpcError::Rpc {
            code: -32005,
            message: "node is behind".into(),
        };
        assert!(err.to_string().contains("-32005"));
    }

    #[test]
    fn test_retryable() {
        assert!(RpcError::RateLimited.is_retryable());
        assert!(RpcError::Timeout(10).is_retryable());
        assert!(!RpcError::InvalidInput("bad address".into()).is_retryable());
    }
}
