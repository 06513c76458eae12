//! Per-item execution with bounded retry and endpoint failover
//!
//! Every failure is captured into the item's Outcome; nothing propagates
//! past this boundary and every invocation produces exactly one Outcome.

use std::time::Duration;
use tokio::time::sleep;

use shared::errors::{ConfigError, OpError};
use shared::types::{BatchConfig, Outcome, WorkItem};

use crate::endpoint_pool::EndpointPool;
use crate::operations::WalletOperation;

#[derive(Clone)]
pub struct OperationExecutor {
    max_retries: u32,
    retry_delay: Duration,
}

impl OperationExecutor {
    pub fn new(config: &BatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        })
    }

    /// Run one work item to its terminal Outcome.
    ///
    /// A rate-limit-class failure rotates the shared pool before the next
    /// attempt; every failure kind consumes one attempt from the same budget.
    pub async fn execute(
        &self,
        item: &WorkItem,
        op: &dyn WalletOperation,
        pool: &EndpointPool,
    ) -> Outcome {
        let mut last_error: Option<OpError> = None;

        for attempt in 1..=self.max_retries {
            let endpoint = pool.current().await;
            metrics::counter!("operation_attempts_total").increment(1);

            match op.run(item, &endpoint).await {
                Ok(output) => {
                    if attempt > 1 {
                        tracing::info!(
                            address = %item.address,
                            attempt,
                            "Operation recovered after retry"
                        );
                    }
                    return Outcome::succeeded(item, output);
                }
                Err(error) => {
                    tracing::warn!(
                        address = %item.address,
                        endpoint = %endpoint.url(),
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "Operation attempt failed"
                    );

                    if error.kind.triggers_rotation() {
                        pool.rotate().await;
                    }

                    last_error = Some(error);
                    if attempt < self.max_retries {
                        metrics::counter!("operation_retries_total").increment(1);
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        metrics::counter!("operation_failures_total").increment(1);

        // max_retries >= 1 is enforced at construction, so at least one
        // attempt ran and recorded its error.
        let error = last_error.unwrap_or_else(|| OpError::rejected("no attempt was made"));
        Outcome::failed(item, error)
    }
}
