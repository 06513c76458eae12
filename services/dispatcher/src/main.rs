use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, Bytes, U256};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use dispatcher::aggregator;
use dispatcher::config::Config;
use dispatcher::endpoint_pool::EndpointPool;
use dispatcher::operations::{
    ApproveOperation, BalanceOperation, RawSendOperation, WalletOperation,
};
use dispatcher::report::{self, RunReport};
use dispatcher::scheduler::BatchScheduler;
use dispatcher::wallets;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bulk wallet operations against BNB Smart Chain RPC endpoints"
)]
struct Cli {
    /// Path to the wallet list JSON file
    #[arg(long, default_value = "wallets.json")]
    wallets: String,

    /// Write the outcome report here (default: <operation>_result.json)
    #[arg(long)]
    output: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue an ERC-20 approval from every wallet
    Approve {
        /// Token contract address
        #[arg(long, env = "APPROVE_TOKEN")]
        token: String,

        /// Spender granted the allowance
        #[arg(long, env = "APPROVE_SPENDER")]
        spender: String,

        /// Allowance in whole token units (18 decimals)
        #[arg(long, env = "APPROVE_AMOUNT", default_value = "250")]
        amount: String,
    },

    /// Query native and token balances for every wallet
    Balance {
        /// Token contract addresses to include (repeatable)
        #[arg(long = "token", env = "BALANCE_TOKENS", value_delimiter = ',')]
        tokens: Vec<String>,
    },

    /// Broadcast prebuilt calldata to a contract from every wallet
    Send {
        /// Target contract address
        #[arg(long, env = "SEND_TO")]
        to: String,

        /// Hex-encoded calldata
        #[arg(long, env = "SEND_DATA")]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    tracing::info!(
        service = "dispatcher",
        version = env!("CARGO_PKG_VERSION"),
        "Starting dispatcher"
    );

    let config = Config::load()?;
    tracing::info!(
        rpc_count = config.rpc.urls.len(),
        chain_id = config.rpc.chain_id,
        batch_size = config.batch.batch_size,
        max_retries = config.batch.max_retries,
        "Configuration loaded"
    );

    let pool = EndpointPool::new(&config.rpc.urls)?;
    let scheduler = BatchScheduler::new(config.batch.clone())?;

    let (operation, default_output) = build_operation(&cli.command, &config, &pool).await?;
    let require_keys = !matches!(cli.command, Command::Balance { .. });

    let items = wallets::load_wallets(&cli.wallets, require_keys)?;
    if items.is_empty() {
        tracing::warn!("Wallet list is empty after filtering; nothing to do");
    }

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(
        run_id = %run_id,
        operation = operation.name(),
        wallet_count = items.len(),
        "Dispatching work"
    );

    let outcomes = scheduler.run(&items, operation.as_ref(), &pool).await;
    let finished_at = Utc::now();

    let summary = aggregator::summarize(&outcomes);
    report::log_summary(&summary);

    let output = cli.output.clone().unwrap_or(default_output);
    report::write_report(
        &output,
        &RunReport {
            run_id,
            operation: operation.name(),
            started_at,
            finished_at,
            summary: &summary,
            outcomes: &outcomes,
        },
    )?;

    if summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

async fn build_operation(
    command: &Command,
    config: &Config,
    pool: &EndpointPool,
) -> Result<(Box<dyn WalletOperation>, String)> {
    match command {
        Command::Approve {
            token,
            spender,
            amount,
        } => {
            let operation = ApproveOperation::new(
                parse_address(token, "token")?,
                parse_address(spender, "spender")?,
                parse_amount(amount)?,
                config.gas.approve_gas_limit,
                config.gas.gas_price,
                config.rpc.chain_id,
            );
            Ok((Box::new(operation), "approve_result.json".to_string()))
        }
        Command::Balance { tokens } => {
            let addresses = tokens
                .iter()
                .map(|token| parse_address(token, "token"))
                .collect::<Result<Vec<_>>>()?;

            let endpoint = pool.current().await;
            let operation = BalanceOperation::resolve(&endpoint, &addresses)
                .await
                .map_err(|e| anyhow::anyhow!("token metadata resolution failed: {e}"))?;
            Ok((Box::new(operation), "balances_result.json".to_string()))
        }
        Command::Send { to, data } => {
            let calldata: Bytes = data
                .trim()
                .parse()
                .with_context(|| "calldata is not valid hex".to_string())?;

            let operation = RawSendOperation::new(
                parse_address(to, "to")?,
                calldata,
                config.gas.send_gas_limit,
                config.gas.gas_price,
                config.rpc.chain_id,
            );
            Ok((Box::new(operation), "send_result.json".to_string()))
        }
    }
}

fn parse_address(value: &str, field: &str) -> Result<Address> {
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid {field} address: {value}"))
}

fn parse_amount(value: &str) -> Result<U256> {
    let parsed = parse_units(value.trim(), 18u8)
        .with_context(|| format!("invalid token amount: {value}"))?;
    Ok(parsed.get_absolute())
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string())
        .eq_ignore_ascii_case("json");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dispatcher=info".into());

    if use_json {
        // JSON structured logging for unattended runs
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable logging for interactive runs
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
