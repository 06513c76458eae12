/// Shared constants for the wallet operation dispatcher
///
/// This module centralizes all magic numbers and default settings
/// to prevent inconsistencies between the engine, the operations and the CLI.

/// BNB Smart Chain mainnet chain id
pub const BSC_CHAIN_ID: u64 = 56;

/// Symbol used for the native coin in balance totals
pub const NATIVE_SYMBOL: &str = "BNB";

/// Decimals of the native coin
pub const NATIVE_DECIMALS: u8 = 18;

/// Public BSC RPC endpoints used when no endpoint list is configured
///
/// All of these are unauthenticated community endpoints; they rate-limit
/// aggressively, which is exactly what the rotation logic exists for.
pub const DEFAULT_RPC_URLS: [&str; 6] = [
    "https://bsc-dataseed1.binance.org/",
    "https://bsc-dataseed2.binance.org/",
    "https://bsc-dataseed3.binance.org/",
    "https://bsc-dataseed4.binance.org/",
    "https://bsc.nodereal.io",
    "https://bsc.publicnode.com",
];

/// Wallets processed concurrently per batch
///
/// Rationale: 20 concurrent requests stays under the burst limits of the
/// public endpoints while keeping a 200-wallet run short.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Attempt budget per wallet, first try included
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause between attempts for one wallet (milliseconds)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3_000;

/// Pause between consecutive batches (milliseconds)
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 2_000;

/// Default legacy gas price in gwei (BSC convention)
pub const DEFAULT_GAS_PRICE_GWEI: u64 = 5;

/// Gas limit for ERC-20 approve transactions
pub const APPROVE_GAS_LIMIT: u64 = 100_000;

/// Gas limit for raw calldata broadcasts
///
/// The original payload is a multicall into a router contract; 1M gas
/// covers it with headroom.
pub const RAW_SEND_GAS_LIMIT: u64 = 1_000_000;

/// Receipt polling cadence (milliseconds)
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 1_000;

/// How long to wait for a receipt before declaring the attempt failed
///
/// BSC produces a block every ~3 seconds; two minutes covers severe
/// congestion without stalling a batch forever.
pub const RECEIPT_TIMEOUT_MS: u64 = 120_000;

/// Wei per gwei
pub const GWEI_IN_WEI: u128 = 1_000_000_000;
