//! Built-in endpoint lists.
//!
//! Keyed premium providers come from environment variables and drop out when
//! unset; the public endpoint is always present so a bare install still works.

use crate::blockchain::types::Chain;
use crate::config::schema::EndpointConfig;

/// Environment variable for a Helius Solana RPC URL (API key embedded).
pub const HELIUS_RPC_URL_ENV: &str = "HELIUS_RPC_URL";
/// Environment variable for an Alchemy Solana RPC URL.
pub const ALCHEMY_SOLANA_RPC_URL_ENV: &str = "ALCHEMY_SOLANA_RPC_URL";
/// Environment variable for an Alchemy Ethereum RPC URL.
pub const ALCHEMY_ETH_RPC_URL_ENV: &str = "ALCHEMY_ETH_RPC_URL";

/// Default endpoints for a chain.
pub fn default_endpoints(chain: Chain) -> Vec<EndpointConfig> {
    match chain {
        Chain::Solana => solana_endpoints(),
        Chain::Evm => evm_endpoints(),
    }
}

fn solana_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::from_env("helius", HELIUS_RPC_URL_ENV, 1),
        EndpointConfig::from_env("alchemy", ALCHEMY_SOLANA_RPC_URL_ENV, 2),
        EndpointConfig::new("solana-public", "https://api.mainnet-beta.solana.com", 3),
    ]
}

fn evm_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::from_env("alchemy", ALCHEMY_ETH_RPC_URL_ENV, 1),
        EndpointConfig::new("publicnode", "https://ethereum-rpc.publicnode.com", 2),
        EndpointConfig::new("llamarpc", "https://eth.llamarpc.com", 3),
    ]
}
