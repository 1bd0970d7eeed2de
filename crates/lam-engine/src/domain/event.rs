//! # Events
//!
//! Append-only records contracts emit while a transaction executes. Events
//! buffer inside the scope and only become visible when the transaction
//! commits.

use serde::{Deserialize, Serialize};

// =============================================================================
// EVENT
// =============================================================================

/// A single contract-emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event kind, e.g. `TRANSFER` or `APPROVE`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable event text.
    pub message: String,
    /// Contract that emitted the event.
    pub contract: String,
}

impl Event {
    /// Creates an event stamped with the emitting contract.
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        contract: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            contract: contract.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
