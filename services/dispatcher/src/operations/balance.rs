//! Native and token balance queries
//!
//! Token metadata (symbol, decimals) is resolved once per run so the
//! per-wallet path does only balance reads.

use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use futures::future::try_join_all;

use shared::constants::NATIVE_DECIMALS;
use shared::errors::OpError;
use shared::types::{OperationOutput, TokenBalance, WorkItem};

use crate::endpoint_pool::Endpoint;
use crate::operations::{classify_rpc_error, eth_call, WalletOperation, IERC20};

/// Metadata for one configured token contract.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

pub struct BalanceOperation {
    tokens: Vec<TokenInfo>,
}

impl BalanceOperation {
    /// Resolve `symbol()` and `decimals()` for each configured token.
    ///
    /// Runs once before batching; a token that cannot be resolved aborts the
    /// run during setup instead of failing every wallet later.
    pub async fn resolve(endpoint: &Endpoint, tokens: &[Address]) -> Result<Self, OpError> {
        let mut resolved = Vec::with_capacity(tokens.len());

        for &address in tokens {
            let raw = eth_call(endpoint, address, IERC20::symbolCall {}.abi_encode()).await?;
            let symbol = IERC20::symbolCall::abi_decode_returns(&raw)
                .map_err(|e| OpError::rejected(format!("token {address}: bad symbol(): {e}")))?;

            let raw = eth_call(endpoint, address, IERC20::decimalsCall {}.abi_encode()).await?;
            let decimals = IERC20::decimalsCall::abi_decode_returns(&raw)
                .map_err(|e| OpError::rejected(format!("token {address}: bad decimals(): {e}")))?;

            tracing::info!(token = %address, symbol = %symbol, decimals, "Resolved token metadata");
            resolved.push(TokenInfo {
                address,
                symbol,
                decimals,
            });
        }

        Ok(Self { tokens: resolved })
    }

    pub fn tokens(&self) -> &[TokenInfo] {
        &self.tokens
    }

    async fn query_token(
        &self,
        token: &TokenInfo,
        item: &WorkItem,
        endpoint: &Endpoint,
    ) -> Result<TokenBalance, OpError> {
        let calldata = IERC20::balanceOfCall {
            account: item.address,
        }
        .abi_encode();

        let raw = eth_call(endpoint, token.address, calldata).await?;
        let balance = IERC20::balanceOfCall::abi_decode_returns(&raw).map_err(|e| {
            OpError::rejected(format!("token {}: bad balanceOf(): {e}", token.address))
        })?;

        Ok(TokenBalance {
            symbol: token.symbol.clone(),
            amount: to_decimal(balance, token.decimals)?,
        })
    }
}

#[async_trait]
impl WalletOperation for BalanceOperation {
    fn name(&self) -> &'static str {
        "balance"
    }

    async fn run(
        &self,
        item: &WorkItem,
        endpoint: &Endpoint,
    ) -> Result<OperationOutput, OpError> {
        let native_query = async {
            endpoint
                .provider()
                .get_balance(item.address)
                .await
                .map_err(|e| classify_rpc_error(&e))
        };
        let token_queries = try_join_all(
            self.tokens
                .iter()
                .map(|token| self.query_token(token, item, endpoint)),
        );

        let (native_wei, tokens) = tokio::try_join!(native_query, token_queries)?;

        Ok(OperationOutput::Balances {
            native: to_decimal(native_wei, NATIVE_DECIMALS)?,
            tokens,
        })
    }
}

fn to_decimal(value: U256, decimals: u8) -> Result<f64, OpError> {
    let formatted = format_units(value, decimals)
        .map_err(|e| OpError::rejected(format!("unit formatting failed: {e}")))?;

    formatted
        .parse::<f64>()
        .map_err(|e| OpError::rejected(format!("balance parse failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_decimal_scales_by_token_decimals() {
        let wei = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(to_decimal(wei, 18).unwrap(), 1.5);

        let usdt_6 = U256::from(2_500_000u64);
        assert_eq!(to_decimal(usdt_6, 6).unwrap(), 2.5);
    }

    #[test]
    fn to_decimal_handles_zero() {
        assert_eq!(to_decimal(U256::ZERO, 18).unwrap(), 0.0);
    }
}
