/// Batch scheduling and retry behavior of the execution engine
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use alloy::primitives::Address;

use dispatcher::endpoint_pool::{Endpoint, EndpointPool};
use dispatcher::scheduler::BatchScheduler;
use shared::errors::{ConfigError, ErrorKind, OpError};
use shared::types::{BatchConfig, OperationOutput, WorkItem};

/// Operation stub that fails a configurable number of times per item before
/// succeeding, counting every invocation.
struct FlakyOperation {
    attempts: Vec<AtomicUsize>,
    failures_before_success: usize,
}

impl FlakyOperation {
    fn new(item_count: usize, failures_before_success: usize) -> Self {
        Self {
            attempts: (0..item_count).map(|_| AtomicUsize::new(0)).collect(),
            failures_before_success,
        }
    }

    fn attempts_for(&self, index: usize) -> usize {
        self.attempts[index].load(Ordering::SeqCst)
    }

    fn total_attempts(&self) -> usize {
        self.attempts
            .iter()
            .map(|count| count.load(Ordering::SeqCst))
            .sum()
    }
}

#[async_trait]
impl dispatcher::operations::WalletOperation for FlakyOperation {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn run(
        &self,
        item: &WorkItem,
        _endpoint: &Endpoint,
    ) -> Result<OperationOutput, OpError> {
        let attempt = self.attempts[item.index].fetch_add(1, Ordering::SeqCst);

        if attempt < self.failures_before_success {
            Err(OpError::timeout("synthetic failure"))
        } else {
            Ok(OperationOutput::Broadcast {
                tx_hash: format!("0x{:064x}", item.index),
                gas_used: None,
            })
        }
    }
}

fn items(count: usize) -> Vec<WorkItem> {
    (0..count)
        .map(|index| WorkItem {
            index,
            address: Address::repeat_byte((index % 256) as u8),
            private_key: None,
        })
        .collect()
}

fn pool() -> EndpointPool {
    EndpointPool::new(&["http://rpc-a.test".to_string()]).unwrap()
}

fn config(batch_size: usize, inter_batch_delay_ms: u64, max_retries: u32) -> BatchConfig {
    BatchConfig {
        batch_size,
        inter_batch_delay_ms,
        max_retries,
        retry_delay_ms: 0,
    }
}

#[tokio::test]
async fn outcomes_preserve_input_order() {
    let items = items(45);
    let op = FlakyOperation::new(45, 0);
    let scheduler = BatchScheduler::new(config(20, 0, 3)).unwrap();

    let outcomes = scheduler.run(&items, &op, &pool()).await;

    assert_eq!(outcomes.len(), 45);
    for (position, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.index, position);
        assert!(outcome.success);
    }
    assert_eq!(op.total_attempts(), 45, "each item should run exactly once");
}

#[tokio::test]
async fn inter_batch_delay_applies_between_batches_only() {
    // 45 items at batch size 20 form 3 batches, so exactly 2 delays.
    let items = items(45);
    let op = FlakyOperation::new(45, 0);
    let scheduler = BatchScheduler::new(config(20, 100, 1)).unwrap();

    let start = Instant::now();
    let outcomes = scheduler.run(&items, &op, &pool()).await;
    let elapsed = start.elapsed();

    assert_eq!(outcomes.len(), 45);
    assert!(
        elapsed >= Duration::from_millis(200),
        "expected 2 inter-batch delays, elapsed {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(400),
        "expected no delay after the final batch, elapsed {elapsed:?}"
    );
}

#[tokio::test]
async fn single_batch_skips_inter_batch_delay() {
    let items = items(5);
    let op = FlakyOperation::new(5, 0);
    let scheduler = BatchScheduler::new(config(20, 200, 1)).unwrap();

    let start = Instant::now();
    let outcomes = scheduler.run(&items, &op, &pool()).await;

    assert_eq!(outcomes.len(), 5);
    assert!(start.elapsed() < Duration::from_millis(150));
}

#[tokio::test]
async fn empty_input_returns_immediately() {
    let op = FlakyOperation::new(0, 0);
    let scheduler = BatchScheduler::new(config(20, 500, 3)).unwrap();

    let start = Instant::now();
    let outcomes = scheduler.run(&[], &op, &pool()).await;

    assert!(outcomes.is_empty());
    assert_eq!(op.total_attempts(), 0);
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[tokio::test]
async fn failures_consume_the_whole_retry_budget() {
    let items = items(4);
    let op = FlakyOperation::new(4, usize::MAX);
    let scheduler = BatchScheduler::new(config(2, 0, 3)).unwrap();

    let outcomes = scheduler.run(&items, &op, &pool()).await;

    for outcome in &outcomes {
        assert!(!outcome.success);
        let error = outcome.error.as_ref().expect("failed outcome carries error");
        assert_eq!(error.kind, ErrorKind::TransientNetwork);
    }
    for index in 0..4 {
        assert_eq!(op.attempts_for(index), 3, "item {index} exceeded budget");
    }
}

#[tokio::test]
async fn success_stops_retrying() {
    let items = items(1);
    let op = FlakyOperation::new(1, 0);
    let scheduler = BatchScheduler::new(config(1, 0, 5)).unwrap();

    let outcomes = scheduler.run(&items, &op, &pool()).await;

    assert!(outcomes[0].success);
    assert_eq!(op.attempts_for(0), 1, "no attempt after a success");
}

#[tokio::test]
async fn recovery_consumes_exactly_one_retry() {
    let items = items(1);
    let op = FlakyOperation::new(1, 1);
    let scheduler = BatchScheduler::new(config(1, 0, 3)).unwrap();

    let outcomes = scheduler.run(&items, &op, &pool()).await;

    assert!(outcomes[0].success);
    assert_eq!(op.attempts_for(0), 2);
}

#[tokio::test]
async fn zero_batch_size_is_a_config_error() {
    let result = BatchScheduler::new(config(0, 0, 3));
    assert!(matches!(result, Err(ConfigError::ZeroBatchSize)));
}

#[tokio::test]
async fn zero_retry_budget_is_a_config_error() {
    let result = BatchScheduler::new(config(20, 0, 0));
    assert!(matches!(result, Err(ConfigError::ZeroMaxRetries)));
}
