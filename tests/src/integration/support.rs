//! Shared fixtures for driving the engine through its public surface.
//!
//! Every helper goes through [`EngineService`] exactly the way an indexer
//! would: anchoring metadata plus a call inscription in, a log entry out.

use lam_contracts::standard_catalog;
use lam_engine::domain::value::U256;
use lam_engine::prelude::*;

/// Default block height for test transactions; past every stock activation.
pub const BLOCK: u64 = 840_000;

/// Engine over the standard contract suite with in-memory stores.
pub fn engine() -> EngineService {
    let catalog = standard_catalog().expect("standard catalog");
    EngineService::in_memory(catalog, EngineConfig::default())
}

/// Anchoring metadata with `sender == origin`, the direct-wallet case.
pub fn meta(sender: &str, hash: &str, block_number: u64) -> TxMetadata {
    TxMetadata {
        sender: sender.to_string(),
        origin: sender.to_string(),
        transaction_hash: hash.to_string(),
        block_number,
        timestamp: 1_700_000_000,
    }
}

/// Processes one call inscription at an explicit block height.
pub async fn run_at(
    engine: &EngineService,
    block_number: u64,
    sender: &str,
    hash: &str,
    contract: &str,
    function: &str,
    args: Vec<serde_json::Value>,
) -> TransactionLogEntry {
    engine
        .process_inscription(
            meta(sender, hash, block_number),
            &Inscription::call(contract, function, args),
        )
        .await
        .expect("inscription should reach a log entry")
}

/// Processes one call inscription at [`BLOCK`].
pub async fn run(
    engine: &EngineService,
    sender: &str,
    hash: &str,
    contract: &str,
    function: &str,
    args: Vec<serde_json::Value>,
) -> TransactionLogEntry {
    run_at(engine, BLOCK, sender, hash, contract, function, args).await
}

/// Like [`run_at`], asserting the entry committed.
pub async fn ok_at(
    engine: &EngineService,
    block_number: u64,
    sender: &str,
    hash: &str,
    contract: &str,
    function: &str,
    args: Vec<serde_json::Value>,
) -> TransactionLogEntry {
    let entry = run_at(engine, block_number, sender, hash, contract, function, args).await;
    assert!(
        entry.is_success(),
        "expected SUCCESS for {contract}.{function}, got {:?}",
        entry.status
    );
    entry
}

/// Like [`run`], asserting the entry committed.
pub async fn ok(
    engine: &EngineService,
    sender: &str,
    hash: &str,
    contract: &str,
    function: &str,
    args: Vec<serde_json::Value>,
) -> TransactionLogEntry {
    ok_at(engine, BLOCK, sender, hash, contract, function, args).await
}

/// Unwraps the error message of an ERROR entry.
pub fn error_of(entry: &TransactionLogEntry) -> &str {
    match &entry.status {
        LogStatus::Error { error_message } => error_message,
        LogStatus::Success => panic!("expected an ERROR entry, got SUCCESS"),
    }
}

/// Converts wire-style JSON arguments to domain values.
pub fn vals(args: Vec<serde_json::Value>) -> Vec<Value> {
    args.iter().map(Value::from_json).collect()
}

/// The first event of a kind on an entry, by message.
pub fn event_message(entry: &TransactionLogEntry, kind: &str) -> String {
    entry
        .event_logs
        .iter()
        .find(|event| event.kind == kind)
        .map(|event| event.message.clone())
        .unwrap_or_else(|| panic!("no {kind} event on entry {}", entry.transaction_hash))
}

/// Committed balance via the `balanceOf` query.
pub async fn balance_of(engine: &EngineService, token: &str, wallet: &str) -> U256 {
    engine
        .call_query(token, "balanceOf", vec![Value::Text(wallet.to_string())])
        .await
        .expect("balanceOf query")
        .coerce_bigint()
        .expect("bigint balance")
}

/// Committed supply via the `totalSupply` query.
pub async fn total_supply(engine: &EngineService, token: &str) -> U256 {
    engine
        .call_query(token, "totalSupply", vec![])
        .await
        .expect("totalSupply query")
        .coerce_bigint()
        .expect("bigint supply")
}
