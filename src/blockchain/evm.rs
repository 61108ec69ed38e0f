//! EVM ledger queries through alloy providers.
//!
//! One HTTP provider is built per registry endpoint at startup; operations
//! look the provider up by endpoint name on every attempt.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::TransportError;
use async_trait::async_trait;

use crate::blockchain::types::{RpcError, RpcResult};
use crate::endpoints::{ConfigurationError, Endpoint, EndpointRegistry};
use crate::failover::{operation, LogicalOperation};
use crate::health::Probe;

type SharedProvider = Arc<dyn Provider + Send + Sync>;

/// Builds EVM read operations for the failover client.
#[derive(Clone)]
pub struct EvmRpc {
    providers: Arc<HashMap<String, SharedProvider>>,
}

impl EvmRpc {
    /// Create one provider per registered endpoint.
    pub fn new(registry: &EndpointRegistry) -> Result<Self, ConfigurationError> {
        let mut providers = HashMap::new();

        for endpoint in registry.list() {
            let url: url::Url = endpoint.url.parse().map_err(|e: url::ParseError| {
                ConfigurationError::InvalidUrl {
                    name: endpoint.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as SharedProvider;
            providers.insert(endpoint.name.clone(), provider);
        }

        Ok(Self {
            providers: Arc::new(providers),
        })
    }

    fn provider(&self, endpoint: &Endpoint) -> RpcResult<SharedProvider> {
        self.providers.get(&endpoint.name).cloned().ok_or_else(|| {
            RpcError::InvalidInput(format!("no provider for endpoint '{}'", endpoint.name))
        })
    }

    /// Native balance of `address` in wei. Zero is a valid answer.
    pub fn balance(&self, address: Address) -> impl LogicalOperation<Output = U256> {
        let rpc = self.clone();
        operation("eth_getBalance", move |endpoint: Arc<Endpoint>| {
            let provider = rpc.provider(&endpoint);
            async move {
                provider?
                    .get_balance(address)
                    .await
                    .map_err(transport_error)
            }
        })
    }

    /// Latest block number.
    pub fn block_number(&self) -> impl LogicalOperation<Output = u64> {
        let rpc = self.clone();
        operation("eth_blockNumber", move |endpoint: Arc<Endpoint>| {
            let provider = rpc.provider(&endpoint);
            async move { provider?.get_block_number().await.map_err(transport_error) }
        })
    }

    /// Chain ID reported by the endpoint.
    pub fn chain_id(&self) -> impl LogicalOperation<Output = u64> {
        let rpc = self.clone();
        operation("eth_chainId", move |endpoint: Arc<Endpoint>| {
            let provider = rpc.provider(&endpoint);
            async move { provider?.get_chain_id().await.map_err(transport_error) }
        })
    }

    /// Receipt for `tx_hash`. `None` while pending or unknown.
    pub fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl LogicalOperation<Output = Option<TransactionReceipt>> {
        let rpc = self.clone();
        operation("eth_getTransactionReceipt", move |endpoint: Arc<Endpoint>| {
            let provider = rpc.provider(&endpoint);
            async move {
                provider?
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(transport_error)
            }
        })
    }
}

/// Liveness: fetch the latest block number.
#[async_trait]
impl Probe for EvmRpc {
    async fn check(&self, endpoint: &Endpoint) -> RpcResult<()> {
        let provider = self.provider(endpoint)?;
        provider.get_block_number().await.map_err(transport_error)?;
        Ok(())
    }
}

impl std::fmt::Debug for EvmRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmRpc")
            .field("endpoints", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn transport_error(e: TransportError) -> RpcError {
    match e.as_error_resp() {
        Some(payload) => RpcError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => RpcError::Http(e.to_string()),
    }
}
