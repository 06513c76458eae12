/// Domain types shared between the execution engine, the operations and
/// the CLI.
///
/// WorkItems are built once from the wallet list and never mutated; each one
/// yields exactly one Outcome, collected in input order.
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::constants::*;
use crate::errors::{ConfigError, OpError};

/// One unit of work: a single wallet from the input list
///
/// The operation payload (spender, amount, token set, calldata) is uniform
/// for a whole run and lives on the operation value, not here.
#[derive(Clone)]
pub struct WorkItem {
    /// 0-based position in the full input list
    pub index: usize,

    /// Wallet address
    pub address: Address,

    /// Hex-encoded signing key, absent for read-only runs
    pub private_key: Option<String>,
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("index", &self.index)
            .field("address", &self.address)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Per-token balance figure, formatted with the token's own decimals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenBalance {
    pub symbol: String,
    pub amount: f64,
}

/// Successful result data, shaped per operation variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationOutput {
    /// ERC-20 allowance granted and confirmed
    Approval {
        tx_hash: String,
        gas_used: Option<u64>,
    },

    /// Native and token balances for one wallet
    Balances {
        native: f64,
        tokens: Vec<TokenBalance>,
    },

    /// Prebuilt calldata broadcast and confirmed
    Broadcast {
        tx_hash: String,
        gas_used: Option<u64>,
    },
}

/// Terminal result recorded for one WorkItem
///
/// Exactly one Outcome exists per item; it is never retried or mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub index: usize,
    pub address: Address,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OperationOutput>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OpError>,
}

impl Outcome {
    pub fn succeeded(item: &WorkItem, output: OperationOutput) -> Self {
        Self {
            index: item.index,
            address: item.address,
            success: true,
            output: Some(output),
            error: None,
        }
    }

    pub fn failed(item: &WorkItem, error: OpError) -> Self {
        Self {
            index: item.index,
            address: item.address,
            success: false,
            output: None,
            error: Some(error),
        }
    }
}

/// Run-level tally produced by the aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Accumulated balances keyed by symbol (native under "BNB")
    pub totals: BTreeMap<String, f64>,
}

/// Batching and retry settings for one run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Wallets processed concurrently per batch, > 0
    pub batch_size: usize,

    /// Pause between consecutive batches (milliseconds)
    pub inter_batch_delay_ms: u64,

    /// Attempt budget per wallet, >= 1 (first try included)
    pub max_retries: u32,

    /// Pause between attempts for one wallet (milliseconds)
    pub retry_delay_ms: u64,
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroMaxRetries);
        }
        Ok(())
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize) -> WorkItem {
        WorkItem {
            index,
            address: Address::ZERO,
            private_key: Some("0xdeadbeef".to_string()),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = BatchConfig {
            batch_size: 0,
            ..BatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBatchSize)));
    }

    #[test]
    fn zero_retry_budget_is_rejected() {
        let config = BatchConfig {
            max_retries: 0,
            ..BatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMaxRetries)));
    }

    #[test]
    fn outcome_constructors_set_flags() {
        let ok = Outcome::succeeded(
            &item(3),
            OperationOutput::Broadcast {
                tx_hash: "0xabc".to_string(),
                gas_used: Some(21_000),
            },
        );
        assert!(ok.success);
        assert_eq!(ok.index, 3);
        assert!(ok.output.is_some());
        assert!(ok.error.is_none());

        let err = Outcome::failed(&item(7), OpError::timeout("synthetic"));
        assert!(!err.success);
        assert_eq!(err.index, 7);
        assert!(err.output.is_none());
        assert!(err.error.is_some());
    }

    #[test]
    fn work_item_debug_redacts_key_material() {
        let rendered = format!("{:?}", item(0));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("deadbeef"));
    }
}
