//! # Transaction Log
//!
//! One entry per processed inscription, recording what ran, what events it
//! produced, and whether it committed or rolled back.

use crate::domain::event::Event;
use crate::domain::metadata::TxMetadata;
use serde::{Deserialize, Serialize};

// =============================================================================
// STATUS
// =============================================================================

/// Outcome of a processed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum LogStatus {
    /// All calls completed and the buffered state committed.
    #[serde(rename = "SUCCESS")]
    Success,
    /// Execution failed; no state or events were committed.
    #[serde(rename = "ERROR")]
    Error {
        /// Display text of the failure.
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

// =============================================================================
// LOG ENTRY
// =============================================================================

/// A committed record of one processed inscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLogEntry {
    /// Wallet that signed the transaction.
    pub sender: String,
    /// Wallet that originated the outermost call.
    pub origin: String,
    /// Anchoring transaction hash.
    pub transaction_hash: String,
    /// Block the transaction was anchored in.
    pub block_number: u64,
    /// Block timestamp.
    pub timestamp: u64,
    /// Entry-point contract; absent on failed transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_contract: Option<String>,
    /// Entry-point function; absent on failed transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Events emitted during execution; empty on failure.
    pub event_logs: Vec<Event>,
    /// The raw inscription, serialized.
    pub inscription: String,
    /// SUCCESS or ERROR with its message.
    #[serde(flatten)]
    pub status: LogStatus,
}

impl TransactionLogEntry {
    /// Builds a SUCCESS entry from the transaction metadata and its results.
    #[must_use]
    pub fn success(
        metadata: &TxMetadata,
        contract: impl Into<String>,
        method: impl Into<String>,
        event_logs: Vec<Event>,
        inscription: String,
    ) -> Self {
        Self {
            sender: metadata.sender.clone(),
            origin: metadata.origin.clone(),
            transaction_hash: metadata.transaction_hash.clone(),
            block_number: metadata.block_number,
            timestamp: metadata.timestamp,
            current_contract: Some(contract.into()),
            method: Some(method.into()),
            event_logs,
            inscription,
            status: LogStatus::Success,
        }
    }

    /// Builds an ERROR entry. Failed transactions carry no events.
    #[must_use]
    pub fn failure(
        metadata: &TxMetadata,
        inscription: String,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            sender: metadata.sender.clone(),
            origin: metadata.origin.clone(),
            transaction_hash: metadata.transaction_hash.clone(),
            block_number: metadata.block_number,
            timestamp: metadata.timestamp,
            current_contract: None,
            method: None,
            event_logs: Vec::new(),
            inscription,
            status: LogStatus::Error {
                error_message: error_message.into(),
            },
        }
    }

    /// Whether the transaction committed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, LogStatus::Success)
    }
}

// =============================================================================
// TESTS
// =============================================================================
