//! Minimal JSON-RPC 2.0 over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::blockchain::types::{RpcError, RpcResult};

/// JSON-RPC "Invalid params".
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Shared HTTP client issuing JSON-RPC calls to arbitrary endpoint URLs.
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    http: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Issue one request. No retries, no timeout beyond the client's own.
    pub async fn call<R>(&self, url: &str, method: &str, params: Value) -> RpcResult<R>
    where
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RpcError::RateLimited);
        }
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = envelope.error {
            if error.code == INVALID_PARAMS {
                return Err(RpcError::InvalidInput(error.message));
            }
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        // A null result is valid for Option<_> targets (e.g. unknown transaction).
        serde_json::from_value(envelope.result).map_err(|e| RpcError::Decode(e.to_string()))
    }
}

impl Default for JsonRpcTransport {
    fn default() -> Self {
        Self::new()
    }
}
