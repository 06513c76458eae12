//! Result sink: JSON report file plus logged run statistics

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use uuid::Uuid;

use shared::types::{Outcome, Summary};

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub operation: &'a str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: &'a Summary,
    pub outcomes: &'a [Outcome],
}

pub fn write_report(path: &str, report: &RunReport<'_>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize run report")?;
    fs::write(path, json).with_context(|| format!("failed to write report to {path}"))?;

    tracing::info!(path, "Results written");
    Ok(())
}

pub fn log_summary(summary: &Summary) {
    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Run statistics"
    );

    for (symbol, amount) in &summary.totals {
        tracing::info!(symbol = %symbol, total = format!("{amount:.4}"), "Accumulated balance");
    }
}
