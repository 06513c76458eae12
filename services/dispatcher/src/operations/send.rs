//! Prebuilt calldata broadcasts

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

use shared::errors::OpError;
use shared::types::{OperationOutput, WorkItem};

use crate::endpoint_pool::Endpoint;
use crate::operations::{send_legacy_tx, signer_for, TxParams, WalletOperation};

/// Broadcasts one fixed calldata blob to one target contract from every
/// wallet. The payload is opaque to the dispatcher; it is signed and sent
/// as-is.
pub struct RawSendOperation {
    to: Address,
    data: Bytes,
    gas_limit: u64,
    gas_price: u128,
    chain_id: u64,
}

impl RawSendOperation {
    pub fn new(to: Address, data: Bytes, gas_limit: u64, gas_price: u128, chain_id: u64) -> Self {
        Self {
            to,
            data,
            gas_limit,
            gas_price,
            chain_id,
        }
    }
}

#[async_trait]
impl WalletOperation for RawSendOperation {
    fn name(&self) -> &'static str {
        "send"
    }

    async fn run(
        &self,
        item: &WorkItem,
        endpoint: &Endpoint,
    ) -> Result<OperationOutput, OpError> {
        let signer = signer_for(item)?;

        let (tx_hash, gas_used) = send_legacy_tx(
            endpoint,
            &signer,
            TxParams {
                to: self.to,
                input: self.data.clone(),
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
            "Transaction confirmed"
        );

        Ok(OperationOutput::Broadcast {
            tx_hash: tx_hash.to_string(),
            gas_used,
        })
    }
}
