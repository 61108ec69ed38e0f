//! rpc-failover command line front-end.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command ──▶ LogicalOperation (solana.rs / evm.rs)
//!                         │
//!                         ▼
//!                  ┌──────────────┐   HealthChecked   ┌──────────────┐
//!                  │ Failover     │──────────────────▶│ HealthRanker │──▶ probes (concurrent)
//!                  │ Client       │◀──── ranking ─────└──────────────┘
//!                  └──────┬───────┘
//!                         │ one endpoint at a time
//!                         ▼
//!                  ┌──────────────┐
//!                  │ RetryExecutor│──▶ attempt (timeout) ──▶ endpoint
//!                  └──────────────┘
//!                         │
//!                         ▼
//!                 OperationOutcome { value, attempt trail }
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;

use rpc_failover::blockchain::{Chain, EvmRpc, SolanaRpc};
use rpc_failover::config::{load_or_default, RpcConfig};
use rpc_failover::endpoints::EndpointRegistry;
use rpc_failover::failover::{FailoverClient, LogicalOperation, Mode};
use rpc_failover::lifecycle::Shutdown;
use rpc_failover::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rpc-failover")]
#[command(about = "Resilient ledger queries across multiple RPC endpoints", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in endpoints are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint selection mode (overrides the config file).
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Simple,
    HealthChecked,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Simple => Mode::Simple,
            ModeArg::HealthChecked => Mode::HealthChecked,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the endpoint registry in preference order
    Endpoints,
    /// Probe every endpoint and print the ranking
    Rank,
    /// Native balance of an address (lamports / wei)
    Balance { address: String },
    /// Current slot (Solana)
    Slot,
    /// Current block height (Solana) or block number (EVM)
    Height,
    /// Transaction by signature (Solana) or receipt by hash (EVM)
    Tx { id: String },
    /// Chain ID reported by the endpoint (EVM)
    ChainId,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        chain = %config.chain,
        endpoints = config.endpoint_configs().len(),
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let registry = Arc::new(EndpointRegistry::from_config(&config)?);
    let mode = cli.mode.map(Mode::from).unwrap_or(config.health_check.mode);

    let shutdown = Arc::new(Shutdown::new());
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            ctrl_c.trigger();
        }
    });

    let session = Session {
        config: &config,
        mode,
        shutdown: &shutdown,
    };

    match config.chain {
        Chain::Solana => {
            let rpc = SolanaRpc::default();
            let client = FailoverClient::from_config(&config, registry, Arc::new(rpc.clone()))?;
            session.solana(&client, &rpc, cli.command).await
        }
        Chain::Evm => {
            let rpc = EvmRpc::new(&registry)?;
            let client = FailoverClient::from_config(&config, registry, Arc::new(rpc.clone()))?;
            session.evm(&client, &rpc, cli.command).await
        }
    }
}

struct Session<'a> {
    config: &'a RpcConfig,
    mode: Mode,
    shutdown: &'a Shutdown,
}

impl Session<'_> {
    async fn solana(
        &self,
        client: &FailoverClient,
        rpc: &SolanaRpc,
        command: Commands,
    ) -> Result<ExitCode, Box<dyn std::error::Error>> {
        match command {
            Commands::Balance { address } => self.run(client, &rpc.balance(&address)?).await,
            Commands::Slot => self.run(client, &rpc.slot()).await,
            Commands::Height => self.run(client, &rpc.block_height()).await,
            Commands::Tx { id } => self.run(client, &rpc.transaction(&id)?).await,
            Commands::ChainId => unsupported("chain-id", self.config.chain),
            other => self.inspect(client, other).await,
        }
    }

    async fn evm(
        &self,
        client: &FailoverClient,
        rpc: &EvmRpc,
        command: Commands,
    ) -> Result<ExitCode, Box<dyn std::error::Error>> {
        match command {
            Commands::Balance { address } => self.run(client, &rpc.balance(address.parse()?)).await,
            Commands::Height => self.run(client, &rpc.block_number()).await,
            Commands::Tx { id } => self.run(client, &rpc.transaction_receipt(id.parse()?)).await,
            Commands::ChainId => self.run(client, &rpc.chain_id()).await,
            Commands::Slot => unsupported("slot", self.config.chain),
            other => self.inspect(client, other).await,
        }
    }

    /// Chain-independent commands.
    async fn inspect(
        &self,
        client: &FailoverClient,
        command: Commands,
    ) -> Result<ExitCode, Box<dyn std::error::Error>> {
        let output = match command {
            Commands::Endpoints => json!(client
                .registry()
                .list()
                .iter()
                .map(|e| json!({ "name": e.name, "url": e.url, "priority": e.priority }))
                .collect::<Vec<_>>()),
            Commands::Rank => json!(client
                .rank()
                .await
                .iter()
                .map(|r| json!({
                    "name": r.endpoint.name,
                    "priority": r.endpoint.priority,
                    "success": r.success,
                    "latency_ms": r.latency_ms,
                    "error": r.error_detail,
                }))
                .collect::<Vec<_>>()),
            _ => return Ok(ExitCode::FAILURE),
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(ExitCode::SUCCESS)
    }

    async fn run<O>(&self, client: &FailoverClient, op: &O) -> Result<ExitCode, Box<dyn std::error::Error>>
    where
        O: LogicalOperation,
        O::Output: Serialize,
    {
        let mut signal = self.shutdown.subscribe();
        let outcome = match client.execute_until(op, self.mode, &mut signal).await {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{}", e);
                return Ok(ExitCode::from(130));
            }
        };

        let trail: Vec<_> = outcome
            .attempts
            .iter()
            .map(|r| json!({
                "endpoint": r.endpoint.name,
                "succeeded": r.succeeded,
                "attempts": r.attempts,
                "error": r.error,
            }))
            .collect();

        match outcome.value {
            Some(value) => {
                let output = json!({ "operation": op.name(), "value": value, "attempts": trail });
                println!("{}", serde_json::to_string_pretty(&output)?);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("{} temporarily unavailable", op.name());
                eprintln!("{}", serde_json::to_string_pretty(&trail)?);
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn unsupported(command: &str, chain: Chain) -> Result<ExitCode, Box<dyn std::error::Error>> {
    eprintln!("'{}' is not available for chain '{}'", command, chain);
    Ok(ExitCode::FAILURE)
}
