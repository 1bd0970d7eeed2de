//! # Inscriptions
//!
//! The wire-format input unit: an externally-ordered instruction selecting a
//! contract, a function, and positional arguments.

use crate::domain::value::Value;
use crate::errors::EngineError;
use serde::{Deserialize, Serialize};

/// Protocol tag every inscription must carry.
pub const PROTOCOL: &str = "lam";

/// The only operation this engine executes.
pub const OP_CALL: &str = "call";

// =============================================================================
// INSCRIPTION
// =============================================================================

/// A contract-call inscription as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inscription {
    /// Protocol tag; must be `"lam"`.
    pub p: String,
    /// Operation; must be `"call"`.
    pub op: String,
    /// Target contract name (template or `dep:`-prefixed alias).
    pub contract: String,
    /// Function to dispatch, looked up by name.
    pub function: String,
    /// Positional arguments.
    pub args: Vec<serde_json::Value>,
}

impl Inscription {
    /// Builds a call inscription with the protocol literals filled in.
    pub fn call(
        contract: impl Into<String>,
        function: impl Into<String>,
        args: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            p: PROTOCOL.to_string(),
            op: OP_CALL.to_string(),
            contract: contract.into(),
            function: function.into(),
            args,
        }
    }

    /// Validates the protocol literals.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.p != PROTOCOL {
            return Err(EngineError::InvalidInscription(format!(
                "unknown protocol '{}'",
                self.p
            )));
        }
        if self.op != OP_CALL {
            return Err(EngineError::InvalidInscription(format!(
                "unknown op '{}'",
                self.op
            )));
        }
        Ok(())
    }

    /// Converts the wire arguments into domain values.
    #[must_use]
    pub fn domain_args(&self) -> Vec<Value> {
        self.args.iter().map(Value::from_json).collect()
    }

    /// Serializes the inscription for embedding into a transaction log entry.
    #[must_use]
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

// =============================================================================
// TESTS
// =============================================================================
