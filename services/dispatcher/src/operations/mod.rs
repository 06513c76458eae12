//! Chain operations executed once per wallet
//!
//! Each operation owns the run-wide payload (token, spender, amount,
//! calldata) and turns one WorkItem into one success value or one typed
//! OpError. RPC failures are classified here, at the collaborator boundary,
//! from structured JSON-RPC error codes; the engine above only dispatches on
//! the resulting ErrorKind.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionInput, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use std::str::FromStr;
use std::time::{Duration, Instant};

use shared::constants::{RECEIPT_POLL_INTERVAL_MS, RECEIPT_TIMEOUT_MS};
use shared::errors::OpError;
use shared::types::{OperationOutput, WorkItem};

use crate::endpoint_pool::Endpoint;

mod approve;
mod balance;
mod send;

pub use approve::ApproveOperation;
pub use balance::{BalanceOperation, TokenInfo};
pub use send::RawSendOperation;

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

/// One chain action performed per wallet.
///
/// Implementations must be cheap to call repeatedly: the executor re-runs
/// them on retry with whatever endpoint the pool currently points at.
#[async_trait]
pub trait WalletOperation: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, item: &WorkItem, endpoint: &Endpoint)
        -> Result<OperationOutput, OpError>;
}

/// JSON-RPC capacity codes that mean "this endpoint is done serving us",
/// as opposed to a transient hiccup or a deterministic rejection.
const RPC_LIMIT_EXCEEDED: i64 = -32005;
const RPC_RATE_LIMITED: i64 = -32016;
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Map a transport-layer error onto the retry taxonomy.
pub(crate) fn classify_rpc_error(err: &RpcError<TransportErrorKind>) -> OpError {
    match err {
        RpcError::ErrorResp(payload) => match payload.code {
            RPC_LIMIT_EXCEEDED | RPC_RATE_LIMITED => {
                OpError::rate_limited(format!("code {}: {}", payload.code, payload.message))
            }
            _ => OpError::rejected(format!(
                "RPC rejected call (code {}): {}",
                payload.code, payload.message
            )),
        },
        RpcError::Transport(kind) => {
            if let TransportErrorKind::HttpError(http) = kind {
                if http.status == HTTP_TOO_MANY_REQUESTS {
                    return OpError::rate_limited(format!("HTTP {}", http.status));
                }
            }
            OpError::connection(kind.to_string())
        }
        RpcError::NullResp => OpError::no_response("null JSON-RPC response"),
        other => OpError::connection(other.to_string()),
    }
}

/// Build a signer from the item's key material.
pub(crate) fn signer_for(item: &WorkItem) -> Result<PrivateKeySigner, OpError> {
    let key = item
        .private_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| OpError::unusable_key(item.address, "key missing from wallet row"))?;

    PrivateKeySigner::from_str(key)
        .map_err(|e| OpError::unusable_key(item.address, e.to_string()))
}

pub(crate) struct TxParams {
    pub to: Address,
    pub input: Bytes,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub chain_id: u64,
}

/// Sign a legacy transaction, broadcast it and wait for its receipt.
///
/// A receipt with a failed status is a deterministic rejection: the call
/// landed on-chain and reverted, so retrying it costs gas for nothing, but
/// the retry policy treats it like any other failure.
pub(crate) async fn send_legacy_tx(
    endpoint: &Endpoint,
    signer: &PrivateKeySigner,
    params: TxParams,
) -> Result<(B256, Option<u64>), OpError> {
    let provider = endpoint.provider();

    let nonce = provider
        .get_transaction_count(signer.address())
        .await
        .map_err(|e| classify_rpc_error(&e))?;

    let mut tx = TxLegacy {
        chain_id: Some(params.chain_id),
        nonce,
        gas_price: params.gas_price,
        gas_limit: params.gas_limit,
        to: TxKind::Call(params.to),
        value: U256::ZERO,
        input: params.input,
    };

    let signature = TxSignerSync::sign_transaction_sync(signer, &mut tx)
        .map_err(|e| OpError::rejected(format!("signing failed: {e}")))?;
    let envelope: TxEnvelope = tx.into_signed(signature).into();
    let raw = envelope.encoded_2718();
    let tx_hash = *envelope.tx_hash();

    provider
        .send_raw_transaction(raw.as_slice())
        .await
        .map_err(|e| classify_rpc_error(&e))?;

    let receipt = await_receipt(endpoint, tx_hash).await?;
    if !receipt.status() {
        return Err(OpError::reverted(format!("tx {tx_hash} failed on-chain")));
    }

    Ok((tx_hash, Some(receipt.gas_used)))
}

async fn await_receipt(endpoint: &Endpoint, tx_hash: B256) -> Result<TransactionReceipt, OpError> {
    let deadline = Instant::now() + Duration::from_millis(RECEIPT_TIMEOUT_MS);

    loop {
        match endpoint.provider().get_transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => return Ok(receipt),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return Err(OpError::timeout(format!(
                        "no receipt for {tx_hash} within {RECEIPT_TIMEOUT_MS}ms"
                    )));
                }
                tokio::time::sleep(Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)).await;
            }
            Err(e) => return Err(classify_rpc_error(&e)),
        }
    }
}

/// Read-only contract call against one endpoint.
pub(crate) async fn eth_call(
    endpoint: &Endpoint,
    to: Address,
    calldata: Vec<u8>,
) -> Result<Bytes, OpError> {
    let request = TransactionRequest {
        to: Some(TxKind::Call(to)),
        input: TransactionInput::new(calldata.into()),
        ..Default::default()
    };

    endpoint
        .provider()
        .call(request)
        .await
        .map_err(|e| classify_rpc_error(&e))
}
