//! # Lambda Engine - Inscription-Driven Contract Execution
//!
//! Deterministic execution engine for contracts addressed by ledger
//! inscriptions. Each transaction runs inside an isolated scope; state,
//! deployments, and events commit as a unit or not at all.
//!
//! ## Layers
//!
//! | Layer | Location | Purpose |
//! |-------|----------|---------|
//! | Domain | `domain/` | Values, metadata, inscriptions, events, PRNG |
//! | Codec | `codec/` | Snapshot encoding with a type side channel |
//! | Contract seam | `contract.rs` | The `Contract` trait, catalog, call context |
//! | Scope | `scope.rs` | Per-transaction buffer, events, randomness |
//! | Execution | `execution/` | Loader, dispatcher, ecosystem facade |
//! | Ports | `ports/` | Outbound store traits |
//! | Adapters | `adapters/` | In-memory and JSON-file stores |
//! | Service | `service.rs` | Transaction orchestration and queries |
//!
//! ## Guarantees
//!
//! - **Atomicity**: a failed call chain leaves no trace beyond an ERROR log
//!   entry; buffered state and pending deployments are discarded.
//! - **Determinism**: randomness is seeded from the transaction hash, and
//!   state round-trips preserve both field order and value types.
//! - **Isolation**: contracts interact only through [`execution::Ecosystem`],
//!   which rewrites the sender to the calling contract on every hop.
//!
//! ## Usage Example
//!
//! ```ignore
//! use lam_engine::prelude::*;
//!
//! let service = EngineService::in_memory(catalog, EngineConfig::default());
//! let entry = service
//!     .process_inscription(metadata, &Inscription::call("token", "transfer", args))
//!     .await?;
//!
//! if entry.is_success() {
//!     println!("events: {:?}", entry.event_logs);
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod contract;
pub mod domain;
pub mod errors;
pub mod execution;
pub mod ports;
pub mod scope;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::event::Event;
    pub use crate::domain::inscription::{Inscription, OP_CALL, PROTOCOL};
    pub use crate::domain::metadata::{CallFrame, TxMetadata};
    pub use crate::domain::random::Mulberry32;
    pub use crate::domain::transaction_log::{LogStatus, TransactionLogEntry};
    pub use crate::domain::value::{StateMap, Value};

    // Codec
    pub use crate::codec::{decode, encode, StateSnapshot};

    // Contract seam
    pub use crate::contract::{
        Args, CallContext, Contract, ContractCatalog, ContractFactory, DEPLOY_PREFIX,
    };

    // Scope
    pub use crate::scope::{Scope, ScopeRegistry, DEFAULT_SCOPE_TTL};

    // Execution
    pub use crate::execution::{ContractHandle, Ecosystem};

    // Ports
    pub use crate::ports::outbound::{
        ContractStateStore, DeployedContract, DeployedContractsStore, TransactionLogStore,
    };

    // Adapters
    pub use crate::adapters::memory::{
        MemoryDeployedStore, MemoryStateStore, MemoryTransactionLog,
    };
    #[cfg(feature = "json-store")]
    pub use crate::adapters::json_file::JsonFileStore;

    // Errors
    pub use crate::errors::{CodecError, EngineError, ExecutionError, ScopeError, StoreError};

    // Service
    pub use crate::service::{EngineConfig, EngineService, EngineStats, QUERY_SENDER};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name carried in the `p` field of every inscription.
pub const PROTOCOL_NAME: &str = domain::inscription::PROTOCOL;

// =============================================================================
// TESTS
// =============================================================================
