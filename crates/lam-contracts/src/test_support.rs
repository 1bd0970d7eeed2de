//! Shared test harness: a full in-memory engine loaded with the standard
//! catalog, driven through inscriptions exactly like production traffic.

use crate::standard_catalog;
use lam_engine::contract::ContractCatalog;
use lam_engine::domain::inscription::Inscription;
use lam_engine::domain::metadata::TxMetadata;
use lam_engine::domain::transaction_log::{LogStatus, TransactionLogEntry};
use lam_engine::domain::value::{Value, U256};
use lam_engine::service::{EngineConfig, EngineService};
use std::sync::atomic::{AtomicU64, Ordering};

/// Block height past every stock activation height.
pub(crate) const DEFAULT_BLOCK: u64 = 840_000;

pub(crate) struct Harness {
    pub service: EngineService,
    next: AtomicU64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_catalog(standard_catalog().unwrap())
    }

    /// Builds a harness around a custom catalog.
    pub fn with_catalog(catalog: ContractCatalog) -> Self {
        Self {
            service: EngineService::in_memory(catalog, EngineConfig::default()),
            next: AtomicU64::new(0),
        }
    }

    /// Processes one inscription at an explicit block height.
    pub async fn call_at(
        &self,
        block: u64,
        sender: &str,
        contract: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> TransactionLogEntry {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let metadata = TxMetadata {
            sender: sender.to_string(),
            origin: sender.to_string(),
            transaction_hash: format!("0xtx{n:x}"),
            block_number: block,
            timestamp: 1_700_000_000 + n,
        };
        self.service
            .process_inscription(metadata, &Inscription::call(contract, function, args))
            .await
            .unwrap()
    }

    /// Processes one inscription at the default block height.
    pub async fn call(
        &self,
        sender: &str,
        contract: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> TransactionLogEntry {
        self.call_at(DEFAULT_BLOCK, sender, contract, function, args)
            .await
    }

    /// Processes an inscription that must succeed.
    pub async fn ok(
        &self,
        sender: &str,
        contract: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> TransactionLogEntry {
        let entry = self.call(sender, contract, function, args).await;
        assert!(
            entry.is_success(),
            "expected {contract}.{function} to succeed, got {:?}",
            entry.status
        );
        entry
    }

    /// Like [`Harness::ok`] with an explicit block height.
    pub async fn ok_at(
        &self,
        block: u64,
        sender: &str,
        contract: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> TransactionLogEntry {
        let entry = self.call_at(block, sender, contract, function, args).await;
        assert!(
            entry.is_success(),
            "expected {contract}.{function} to succeed, got {:?}",
            entry.status
        );
        entry
    }

    /// Processes an inscription that must fail, returning the error message.
    pub async fn err(
        &self,
        sender: &str,
        contract: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> String {
        self.err_at(DEFAULT_BLOCK, sender, contract, function, args)
            .await
    }

    /// Like [`Harness::err`] with an explicit block height.
    pub async fn err_at(
        &self,
        block: u64,
        sender: &str,
        contract: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> String {
        let entry = self.call_at(block, sender, contract, function, args).await;
        match entry.status {
            LogStatus::Error { error_message } => error_message,
            LogStatus::Success => panic!("expected {contract}.{function} to fail"),
        }
    }

    /// Runs a read-only query.
    pub async fn query(
        &self,
        contract: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> Value {
        let args = args.iter().map(Value::from_json).collect();
        self.service.call_query(contract, function, args).await.unwrap()
    }

    /// Queries an LRC-20 balance.
    pub async fn balance_of(&self, token: &str, wallet: &str) -> U256 {
        let value = self
            .query(token, "balanceOf", vec![serde_json::json!(wallet)])
            .await;
        value.coerce_bigint().expect("balanceOf returns a bigint")
    }

    /// Queries an LRC-20 total supply.
    pub async fn total_supply(&self, token: &str) -> U256 {
        let value = self.query(token, "totalSupply", vec![]).await;
        value.coerce_bigint().expect("totalSupply returns a bigint")
    }
}

/// Finds the first event of a kind in an entry, panicking when absent.
pub(crate) fn event_message(entry: &TransactionLogEntry, kind: &str) -> String {
    entry
        .event_logs
        .iter()
        .find(|event| event.kind == kind)
        .unwrap_or_else(|| panic!("no {kind} event in {:?}", entry.event_logs))
        .message
        .clone()
}
