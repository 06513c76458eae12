//! Wallet list input
//!
//! Rows are permissive: a row missing or mangling a required field is
//! skipped with a warning, never an error. Surviving rows are re-indexed
//! 0-based in list order and stay immutable for the rest of the run.

use alloy::primitives::Address;
use anyhow::Context;
use serde::Deserialize;
use std::fs;

use shared::types::WorkItem;

#[derive(Debug, Deserialize)]
struct WalletRow {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    private_key: Option<String>,
}

/// Load the wallet list from a JSON file.
///
/// `require_keys` is set for signing operations; read-only runs accept rows
/// without key material.
pub fn load_wallets(path: &str, require_keys: bool) -> anyhow::Result<Vec<WorkItem>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read wallet list {path}"))?;
    let rows: Vec<WalletRow> =
        serde_json::from_str(&raw).with_context(|| format!("invalid wallet list JSON {path}"))?;

    let items = collect_items(rows, require_keys);
    tracing::info!(path, wallet_count = items.len(), "Loaded wallet list");

    Ok(items)
}

fn collect_items(rows: Vec<WalletRow>, require_keys: bool) -> Vec<WorkItem> {
    let mut items = Vec::new();

    for (row, entry) in rows.into_iter().enumerate() {
        let Some(address_raw) = entry.address else {
            tracing::warn!(row, "Skipping wallet row without address");
            continue;
        };

        let Ok(address) = address_raw.trim().parse::<Address>() else {
            tracing::warn!(row, address = %address_raw, "Skipping wallet row with unparsable address");
            continue;
        };

        let private_key = entry
            .private_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if require_keys && private_key.is_none() {
            tracing::warn!(row, address = %address, "Skipping wallet row without private key");
            continue;
        }

        items.push(WorkItem {
            index: items.len(),
            address,
            private_key,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(json: &str) -> Vec<WalletRow> {
        serde_json::from_str(json).unwrap()
    }

    const MIXED: &str = r#"[
        {"address": "0x55d398326f99059fF775485246999027B3197955", "private_key": "0x01"},
        {"private_key": "0x02"},
        {"address": "not-an-address", "private_key": "0x03"},
        {"address": "0xda77C035E4D5A748b4AB6674327FA446f17098A2"},
        {"address": "0xCA143Ce32Fe78f1f7019d7d551a6402fC5350c73", "private_key": "  "}
    ]"#;

    #[test]
    fn rows_missing_required_fields_are_excluded() {
        let items = collect_items(rows(MIXED), true);
        assert_eq!(items.len(), 1);
        assert!(items[0].private_key.is_some());
    }

    #[test]
    fn keys_are_optional_for_read_only_runs() {
        let items = collect_items(rows(MIXED), false);
        assert_eq!(items.len(), 3);
        assert!(items[1].private_key.is_none());
        assert!(items[2].private_key.is_none());
    }

    #[test]
    fn surviving_rows_are_reindexed_contiguously() {
        let items = collect_items(rows(MIXED), false);
        let indexes: Vec<usize> = items.iter().map(|item| item.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn empty_list_is_not_an_error() {
        assert!(collect_items(rows("[]"), true).is_empty());
    }
}
