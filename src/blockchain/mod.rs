//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! caller asks for balance / slot / block height / transaction
//!     → solana.rs or evm.rs builds a LogicalOperation
//!     → FailoverClient runs it against endpoints one at a time
//!     → jsonrpc.rs (Solana) or alloy providers (EVM) perform the request
//! ```
//!
//! # Constraints
//! - Read-only queries; nothing here signs or submits transactions
//! - Each operation performs exactly one request per attempt
//! - Malformed caller input is rejected before any endpoint is contacted

pub mod evm;
pub mod jsonrpc;
pub mod solana;
pub mod types;

pub use evm::EvmRpc;
pub use jsonrpc::JsonRpcTransport;
pub use solana::SolanaRpc;
pub use types::{Chain, RpcError, RpcResult};
