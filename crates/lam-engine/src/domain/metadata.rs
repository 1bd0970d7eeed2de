//! # Transaction Metadata
//!
//! Immutable per-transaction facts and the per-invocation call frame.
//! Frames are propagated by value: every nested call gets its own copy with
//! `sender` and `current_contract` rewritten, never mutating the caller's.

use serde::{Deserialize, Serialize};

// =============================================================================
// TRANSACTION METADATA
// =============================================================================

/// Facts fixed at transaction ingestion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxMetadata {
    /// Wallet that signed the inscription.
    pub sender: String,
    /// Original initiator; stays constant through nested calls.
    pub origin: String,
    /// Hex transaction hash. Unique per transaction; callers guarantee it.
    pub transaction_hash: String,
    /// Ledger height the inscription was anchored at.
    pub block_number: u64,
    /// Block timestamp in milliseconds.
    pub timestamp: u64,
}

impl TxMetadata {
    /// Builds the outermost call frame targeting `contract`.
    #[must_use]
    pub fn outer_frame(&self, contract: &str) -> CallFrame {
        CallFrame {
            sender: self.sender.clone(),
            origin: self.origin.clone(),
            transaction_hash: self.transaction_hash.clone(),
            block_number: self.block_number,
            timestamp: self.timestamp,
            current_contract: contract.to_string(),
        }
    }
}

// =============================================================================
// CALL FRAME
// =============================================================================

/// Per-invocation view of the metadata.
///
/// The outer frame's `sender` is the transaction sender; a nested frame's
/// `sender` is the *calling contract's name*, which is how contracts
/// authenticate each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Caller identity for this frame.
    pub sender: String,
    /// Original transaction initiator.
    pub origin: String,
    /// Transaction hash this frame executes under.
    pub transaction_hash: String,
    /// Ledger height.
    pub block_number: u64,
    /// Block timestamp in milliseconds.
    pub timestamp: u64,
    /// Contract this frame is executing.
    pub current_contract: String,
}

impl CallFrame {
    /// Builds the child frame for invoking `callee` from this frame.
    ///
    /// The callee observes the current contract as its sender.
    #[must_use]
    pub fn child(&self, callee: &str) -> CallFrame {
        CallFrame {
            sender: self.current_contract.clone(),
            origin: self.origin.clone(),
            transaction_hash: self.transaction_hash.clone(),
            block_number: self.block_number,
            timestamp: self.timestamp,
            current_contract: callee.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
