use std::env;

use shared::constants::*;
use shared::types::BatchConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc: RpcConfig,
    pub batch: BatchConfig,
    pub gas: GasConfig,
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub urls: Vec<String>,
    pub chain_id: u64,
}

#[derive(Debug, Clone)]
pub struct GasConfig {
    /// Legacy gas price in wei
    pub gas_price: u128,
    pub approve_gas_limit: u64,
    pub send_gas_limit: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let urls: Vec<String> = match env::var("RPC_URLS") {
            Ok(list) => list
                .split(',')
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            Err(_) => DEFAULT_RPC_URLS.iter().map(|url| url.to_string()).collect(),
        };

        let gas_price_gwei: u128 = env::var("GAS_PRICE_GWEI")
            .unwrap_or_else(|_| DEFAULT_GAS_PRICE_GWEI.to_string())
            .parse()?;

        Ok(Config {
            rpc: RpcConfig {
                urls,
                chain_id: env::var("CHAIN_ID")
                    .unwrap_or_else(|_| BSC_CHAIN_ID.to_string())
                    .parse()?,
            },
            batch: BatchConfig {
                batch_size: env::var("BATCH_SIZE")
                    .unwrap_or_else(|_| DEFAULT_BATCH_SIZE.to_string())
                    .parse()?,
                inter_batch_delay_ms: env::var("INTER_BATCH_DELAY_MS")
                    .unwrap_or_else(|_| DEFAULT_INTER_BATCH_DELAY_MS.to_string())
                    .parse()?,
                max_retries: env::var("MAX_RETRIES")
                    .unwrap_or_else(|_| DEFAULT_MAX_RETRIES.to_string())
                    .parse()?,
                retry_delay_ms: env::var("RETRY_DELAY_MS")
                    .unwrap_or_else(|_| DEFAULT_RETRY_DELAY_MS.to_string())
                    .parse()?,
            },
            gas: GasConfig {
                gas_price: gas_price_gwei * GWEI_IN_WEI,
                approve_gas_limit: env::var("APPROVE_GAS_LIMIT")
                    .unwrap_or_else(|_| APPROVE_GAS_LIMIT.to_string())
                    .parse()?,
                send_gas_limit: env::var("SEND_GAS_LIMIT")
                    .unwrap_or_else(|_| RAW_SEND_GAS_LIMIT.to_string())
                    .parse()?,
            },
        })
    }
}
