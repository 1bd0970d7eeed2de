//! # Error Types
//!
//! All error types for inscription execution and persistence.

use thiserror::Error;

// =============================================================================
// EXECUTION ERRORS
// =============================================================================

/// Errors raised anywhere in a transaction's call chain.
///
/// Any of these aborts the entire transaction: the orchestrator records an
/// ERROR log entry and commits nothing. There is no local recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Target contract name could not be resolved to an instance.
    #[error("contract {0} not found!")]
    ContractNotFound(String),

    /// Contract's activation height has not been reached.
    #[error("this contract is not active yet!")]
    NotActive,

    /// Dispatch target missing on the contract.
    #[error("execution: function '{function}' does not exist on contract '{contract}'")]
    FunctionNotFound {
        /// Contract that was dispatched into.
        contract: String,
        /// Function name that failed to resolve.
        function: String,
    },

    /// Deployment name is already registered.
    #[error("deploy: this contract name {0} is already taken!")]
    AlreadyDeployed(String),

    /// Deployment name failed validation.
    #[error("deploy: {0}")]
    InvalidDeployName(String),

    /// A contract already executing in this call chain was invoked again.
    #[error("reentrant call into contract '{0}'")]
    Reentrant(String),

    /// Positional argument arity or type mismatch at the dispatch boundary.
    #[error("{context}: argument {position} invalid: expected {expected}")]
    BadArguments {
        /// Function or operation that parsed the args.
        context: String,
        /// Zero-based argument position.
        position: usize,
        /// Human-readable expected type.
        expected: &'static str,
    },

    /// Business-rule violation raised by contract logic. Opaque to the engine.
    #[error("{0}")]
    Contract(String),

    /// Persisted snapshot failed to decode or validate.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Store access failed mid-transaction.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Scope integrity failure observed inside the call chain.
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl ExecutionError {
    /// Shorthand for a contract-raised business error.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract(message.into())
    }

    /// Returns true if the error signals an engine integrity violation
    /// rather than a contract-level failure.
    #[must_use]
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Scope(_) | Self::Store(_))
    }
}

// =============================================================================
// SCOPE ERRORS
// =============================================================================

/// Errors from the transaction scope registry.
///
/// These are programming or integrity errors: callers guarantee transaction
/// hash uniqueness, and no operation may run against a missing scope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// No live scope for the transaction hash.
    #[error("scope not found for transaction {0}")]
    NotFound(String),

    /// A non-expired scope already exists for the transaction hash.
    #[error("scope already exists for transaction {0}")]
    Collision(String),
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from encoding or decoding contract state snapshots.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A type-metadata path does not resolve into the payload.
    #[error("type metadata path {path} does not match payload")]
    DanglingPath {
        /// Rendered path that failed to resolve.
        path: String,
    },

    /// A tagged payload node has the wrong structural shape.
    #[error("payload node at {path} is not a valid {expected}")]
    Mismatch {
        /// Rendered path of the offending node.
        path: String,
        /// Tag the node was expected to satisfy.
        expected: &'static str,
    },

    /// A field restored into a contract has an unexpected type.
    #[error("state field '{field}' has unexpected type (expected {expected})")]
    FieldType {
        /// Snapshot field name.
        field: String,
        /// Expected domain type.
        expected: &'static str,
    },

    /// The stored document is not structurally valid.
    #[error("stored snapshot is malformed: {0}")]
    Malformed(String),
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the persisted stores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("store I/O error: {0}")]
    Io(String),

    /// Stored document could not be parsed.
    #[error("store corruption: {0}")]
    Corrupted(String),

    /// Store is locked by another process.
    #[error("store locked: {0}")]
    Locked(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// ENGINE ERRORS
// =============================================================================

/// Fatal orchestrator-level errors.
///
/// `process_inscription` normally absorbs call-chain failures into an ERROR
/// log entry; only integrity violations escape as `EngineError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Scope lifecycle violation (duplicate hash, missing scope).
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// A store failed while committing or logging.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Inscription failed wire validation.
    #[error("inscription can not be parsed: {0}")]
    InvalidInscription(String),

    /// Contract template registration rejected at startup.
    #[error("catalog: {0}")]
    Catalog(String),
}

// =============================================================================
// TESTS
// =============================================================================
