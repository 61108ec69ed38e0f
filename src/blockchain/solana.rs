//! Solana ledger queries over JSON-RPC.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::blockchain::jsonrpc::JsonRpcTransport;
use crate::blockchain::types::{RpcError, RpcResult};
use crate::endpoints::Endpoint;
use crate::failover::{operation, LogicalOperation};
use crate::health::Probe;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// `{ "context": {...}, "value": T }` wrapper used by several methods.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Builds Solana read operations for the failover client.
#[derive(Debug, Clone, Default)]
pub struct SolanaRpc {
    transport: JsonRpcTransport,
}

impl SolanaRpc {
    pub fn new(transport: JsonRpcTransport) -> Self {
        Self { transport }
    }

    /// Lamport balance of `address`. Zero is a valid answer.
    pub fn balance(&self, address: &str) -> RpcResult<impl LogicalOperation<Output = u64>> {
        let address = check_base58(address, 32..=44, "address")?;
        let transport = self.transport.clone();

        Ok(operation("getBalance", move |endpoint: Arc<Endpoint>| {
            let transport = transport.clone();
            let params = json!([address]);
            async move {
                let balance: WithContext<u64> =
                    transport.call(&endpoint.url, "getBalance", params).await?;
                Ok(balance.value)
            }
        }))
    }

    /// Current slot.
    pub fn slot(&self) -> impl LogicalOperation<Output = u64> {
        self.no_params("getSlot")
    }

    /// Current block height.
    pub fn block_height(&self) -> impl LogicalOperation<Output = u64> {
        self.no_params("getBlockHeight")
    }

    /// Transaction by signature. `None` when the ledger does not know it.
    pub fn transaction(
        &self,
        signature: &str,
    ) -> RpcResult<impl LogicalOperation<Output = Option<Value>>> {
        let signature = check_base58(signature, 64..=88, "signature")?;
        let transport = self.transport.clone();

        Ok(operation("getTransaction", move |endpoint: Arc<Endpoint>| {
            let transport = transport.clone();
            let params = json!([
                signature,
                { "encoding": "json", "maxSupportedTransactionVersion": 0 }
            ]);
            async move {
                transport
                    .call::<Option<Value>>(&endpoint.url, "getTransaction", params)
                    .await
            }
        }))
    }

    fn no_params(&self, method: &'static str) -> impl LogicalOperation<Output = u64> {
        let transport = self.transport.clone();
        operation(method, move |endpoint: Arc<Endpoint>| {
            let transport = transport.clone();
            async move { transport.call::<u64>(&endpoint.url, method, json!([])).await }
        })
    }
}

/// Liveness: fetch the current slot.
#[async_trait]
impl Probe for SolanaRpc {
    async fn check(&self, endpoint: &Endpoint) -> RpcResult<()> {
        let _slot: u64 = self.transport.call(&endpoint.url, "getSlot", json!([])).await?;
        Ok(())
    }
}

fn check_base58(
    value: &str,
    len: std::ops::RangeInclusive<usize>,
    what: &str,
) -> RpcResult<String> {
    let value = value.trim();
    if !len.contains(&value.len()) || !value.chars().all(|c| BASE58_ALPHABET.contains(c)) {
        return Err(RpcError::InvalidInput(format!("malformed {}: '{}'", what, value)));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_validation() {
        let rpc = SolanaRpc::default();
        assert!(rpc.balance("11111111111111111111111111111111").is_ok());
        assert!(rpc.balance("So11111111111111111111111111111111111111112").is_ok());

        for bad in ["", "short", "0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl"] {
            assert!(matches!(rpc.balance(bad), Err(RpcError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_signature_validation() {
        let rpc = SolanaRpc::default();
        assert!(rpc.transaction(&"5".repeat(88)).is_ok());
        assert!(matches!(rpc.transaction("abc"), Err(RpcError::InvalidInput(_))));
    }

    #[test]
    fn test_operation_names() {
        let rpc = SolanaRpc::default();
        assert_eq!(rpc.slot().name(), "getSlot");
        assert_eq!(rpc.block_height().name(), "getBlockHeight");
    }
}
