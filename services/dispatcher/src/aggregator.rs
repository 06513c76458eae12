//! Run-level aggregation over the finished outcome list

use std::collections::BTreeMap;

use shared::constants::NATIVE_SYMBOL;
use shared::types::{OperationOutput, Outcome, Summary};

/// Tally success/failure counts and accumulate balance totals per symbol.
/// Pure function; never mutates its input.
pub fn summarize(outcomes: &[Outcome]) -> Summary {
    let mut summary = Summary {
        total: outcomes.len(),
        succeeded: 0,
        failed: 0,
        totals: BTreeMap::new(),
    };

    for outcome in outcomes {
        if !outcome.success {
            summary.failed += 1;
            continue;
        }
        summary.succeeded += 1;

        if let Some(OperationOutput::Balances { native, tokens }) = &outcome.output {
            *summary.totals.entry(NATIVE_SYMBOL.to_string()).or_insert(0.0) += native;
            for token in tokens {
                *summary.totals.entry(token.symbol.clone()).or_insert(0.0) += token.amount;
            }
        }
    }

    summary
}
