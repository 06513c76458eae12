//! Batch scheduling
//!
//! Slices the wallet list into fixed-size batches, runs each batch's items
//! concurrently behind a full-batch barrier and collects outcomes in input
//! order. Items within a batch interleave on one task; there is no
//! cross-batch pipelining.

use futures::future::join_all;
use std::time::Instant;
use tokio::time::sleep;
use uuid::Uuid;

use shared::errors::ConfigError;
use shared::types::{BatchConfig, Outcome, WorkItem};

use crate::endpoint_pool::EndpointPool;
use crate::executor::OperationExecutor;
use crate::operations::WalletOperation;

pub struct BatchScheduler {
    config: BatchConfig,
    executor: OperationExecutor,
}

impl BatchScheduler {
    pub fn new(config: BatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let executor = OperationExecutor::new(&config)?;

        Ok(Self { config, executor })
    }

    /// Process every item, returning one Outcome per item in input order.
    pub async fn run(
        &self,
        items: &[WorkItem],
        op: &dyn WalletOperation,
        pool: &EndpointPool,
    ) -> Vec<Outcome> {
        if items.is_empty() {
            return Vec::new();
        }

        let batch_count = items.len().div_ceil(self.config.batch_size);
        let mut outcomes = Vec::with_capacity(items.len());

        for (batch_index, chunk) in items.chunks(self.config.batch_size).enumerate() {
            let batch_id = Uuid::new_v4();

            // Each batch starts on a fresh endpoint, independent of any
            // failure-driven rotation inside the previous batch.
            let endpoint = pool.rotate().await;

            tracing::info!(
                batch_id = %batch_id,
                batch = batch_index + 1,
                batch_count,
                batch_size = chunk.len(),
                endpoint = %endpoint.url(),
                "Processing batch"
            );
            metrics::gauge!("items_per_batch").set(chunk.len() as f64);

            let start = Instant::now();
            let results = join_all(
                chunk
                    .iter()
                    .map(|item| self.executor.execute(item, op, pool)),
            )
            .await;

            let succeeded = results.iter().filter(|outcome| outcome.success).count();
            tracing::info!(
                batch_id = %batch_id,
                batch = batch_index + 1,
                succeeded,
                failed = results.len() - succeeded,
                duration_ms = start.elapsed().as_millis() as u64,
                "Batch completed"
            );

            metrics::counter!("batches_processed_total").increment(1);
            metrics::histogram!("batch_duration_seconds").record(start.elapsed().as_secs_f64());

            outcomes.extend(results);

            if batch_index + 1 < batch_count {
                sleep(self.config.inter_batch_delay()).await;
            }
        }

        outcomes
    }
}
