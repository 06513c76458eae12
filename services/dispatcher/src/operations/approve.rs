//! ERC-20 allowance grants

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use shared::errors::OpError;
use shared::types::{OperationOutput, WorkItem};

use crate::endpoint_pool::Endpoint;
use crate::operations::{send_legacy_tx, signer_for, TxParams, WalletOperation, IERC20};

/// Issues `approve(spender, amount)` on one token contract from every wallet.
pub struct ApproveOperation {
    token: Address,
    spender: Address,
    amount: U256,
    gas_limit: u64,
    gas_price: u128,
    chain_id: u64,
}

impl ApproveOperation {
    pub fn new(
        token: Address,
        spender: Address,
        amount: U256,
        gas_limit: u64,
        gas_price: u128,
        chain_id: u64,
    ) -> Self {
        Self {
            token,
            spender,
            amount,
            gas_limit,
            gas_price,
            chain_id,
        }
    }
}

#[async_trait]
impl WalletOperation for ApproveOperation {
    fn name(&self) -> &'static str {
        "approve"
    }

    async fn run(
        &self,
        item: &WorkItem,
        endpoint: &Endpoint,
    ) -> Result<OperationOutput, OpError> {
        let signer = signer_for(item)?;

        let calldata = IERC20::approveCall {
            spender: self.spender,
            amount: self.amount,
        }
        .abi_encode();

        let (tx_hash, gas_used) = send_legacy_tx(
            endpoint,
            &signer,
            TxParams {
                to: self.token,
                input: calldata.into(),
                gas_limit: self.gas_limit,
                gas_price: self.gas_price,
                chain_id: self.chain_id,
            },
        )
        .await?;

        tracing::info!(
            address = %item.address,
            tx_hash = %tx_hash,
            gas_used,
            "Approval confirmed"
        );

        Ok(OperationOutput::Approval {
            tx_hash: tx_hash.to_string(),
            gas_used,
        })
    }
}
