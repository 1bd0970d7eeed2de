//! # Contract Seam
//!
//! The trait every executable contract implements, typed positional argument
//! extraction, the per-transaction buffer cell, and the startup catalog of
//! contract templates.

use crate::domain::event::Event;
use crate::domain::metadata::CallFrame;
use crate::domain::value::{StateMap, Value, U256};
use crate::errors::{CodecError, EngineError, ExecutionError};
use crate::execution::ecosystem::Ecosystem;
use crate::scope::Scope;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Name prefix separating deployed instances from catalog templates.
pub const DEPLOY_PREFIX: &str = "dep:";

/// A buffered contract instance, exclusive for the duration of one call.
///
/// The async mutex is taken with `try_lock`; a second lock attempt within one
/// call chain means the contract re-entered itself and fails deterministically.
pub type ContractCell = Arc<tokio::sync::Mutex<Box<dyn Contract>>>;

// =============================================================================
// CONTRACT TRAIT
// =============================================================================

/// An executable contract template.
///
/// Instances live inside a transaction scope's buffer. All durable state must
/// round-trip through [`Contract::state`] and [`Contract::load_state`];
/// anything else is lost at commit.
#[async_trait]
pub trait Contract: Send + Sync {
    /// Catalog name this instance was built from.
    fn template_name(&self) -> &str;

    /// First block at which external calls are accepted.
    fn active_on(&self) -> u64;

    /// Names callable through [`Contract::call`]. Validated at registration.
    fn functions(&self) -> &'static [&'static str];

    /// Dispatches one function by name.
    async fn call(&mut self, function: &str, ctx: &CallContext)
        -> Result<Value, ExecutionError>;

    /// Renders the durable fields as a state map for snapshotting.
    fn state(&self) -> StateMap;

    /// Restores durable fields from a decoded snapshot.
    ///
    /// Fields absent from the map keep their constructor defaults; unknown
    /// map keys are ignored.
    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError>;
}

impl fmt::Debug for dyn Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("template", &self.template_name())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CALL CONTEXT
// =============================================================================

/// Everything a contract may touch while executing one call.
pub struct CallContext {
    /// Who is calling whom, and under which transaction.
    pub frame: CallFrame,
    /// Cross-contract invoke and deploy, bound to this frame.
    pub ecosystem: Ecosystem,
    /// Positional call arguments.
    pub args: Args,
    scope: Arc<Scope>,
}

impl CallContext {
    /// Binds a context to a frame and its transaction scope.
    #[must_use]
    pub fn new(frame: CallFrame, ecosystem: Ecosystem, scope: Arc<Scope>, args: Args) -> Self {
        Self {
            frame,
            ecosystem,
            args,
            scope,
        }
    }

    /// Wallet or contract that invoked the current call.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.frame.sender
    }

    /// Wallet that signed the outermost transaction.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.frame.origin
    }

    /// Name the executing contract is addressed by.
    #[must_use]
    pub fn current_contract(&self) -> &str {
        &self.frame.current_contract
    }

    /// Block the transaction is anchored in.
    #[must_use]
    pub fn block_number(&self) -> u64 {
        self.frame.block_number
    }

    /// Timestamp of the anchoring block.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.frame.timestamp
    }

    /// Emits an event attributed to the executing contract.
    pub fn emit(&self, kind: impl Into<String>, message: impl Into<String>) {
        self.scope.push_event(Event::new(
            kind,
            message,
            self.frame.current_contract.clone(),
        ));
    }

    /// Next deterministic random value in `[0, 1)`.
    #[must_use]
    pub fn random_f64(&self) -> f64 {
        self.scope.next_f64()
    }

    /// Next deterministic random integer in `[low, high)`.
    #[must_use]
    pub fn random_int(&self, low: u64, high: u64) -> u64 {
        self.scope.next_int(low, high)
    }
}

// =============================================================================
// TYPED ARGUMENTS
// =============================================================================

/// Positional arguments passed into a contract call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    /// Wraps a positional argument list.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of arguments supplied.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw argument at `position`, if present.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.0.get(position)
    }

    /// Extracts the argument at `position` as `T`.
    ///
    /// Missing and mistyped arguments both fail; `context` names the function
    /// in the error.
    pub fn arg<T: FromArg>(&self, context: &str, position: usize) -> Result<T, ExecutionError> {
        let value = self.0.get(position).unwrap_or(&Value::Null);
        T::from_arg(value).ok_or_else(|| ExecutionError::BadArguments {
            context: context.to_string(),
            position,
            expected: T::EXPECTED,
        })
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// Conversion from a positional argument into a concrete parameter type.
pub trait FromArg: Sized {
    /// Type name used in argument errors.
    const EXPECTED: &'static str;

    /// Attempts the conversion.
    fn from_arg(value: &Value) -> Option<Self>;
}

impl FromArg for String {
    const EXPECTED: &'static str = "text";

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

impl FromArg for U256 {
    const EXPECTED: &'static str = "bigint";

    fn from_arg(value: &Value) -> Option<Self> {
        value.coerce_bigint()
    }
}

impl FromArg for u64 {
    const EXPECTED: &'static str = "u64";

    fn from_arg(value: &Value) -> Option<Self> {
        value.coerce_u64()
    }
}

impl FromArg for f64 {
    const EXPECTED: &'static str = "number";

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_number()
    }
}

impl FromArg for bool {
    const EXPECTED: &'static str = "bool";

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromArg for Value {
    const EXPECTED: &'static str = "value";

    fn from_arg(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

// =============================================================================
// CONTRACT CATALOG
// =============================================================================

/// Factory building a fresh instance of one contract template.
pub type ContractFactory = Arc<dyn Fn() -> Box<dyn Contract> + Send + Sync>;

/// Immutable-after-startup registry of contract templates.
#[derive(Default)]
pub struct ContractCatalog {
    templates: HashMap<String, ContractFactory>,
}

impl ContractCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template factory, probing one instance to validate it.
    pub fn register(&mut self, factory: ContractFactory) -> Result<(), EngineError> {
        let probe = factory();
        let name = probe.template_name().to_string();
        if name.is_empty() {
            return Err(EngineError::Catalog(
                "template name cant be empty".to_string(),
            ));
        }
        if name.contains('.') {
            return Err(EngineError::Catalog(format!(
                "'.' is not allowed in template name '{name}'"
            )));
        }
        if name.starts_with(DEPLOY_PREFIX) {
            return Err(EngineError::Catalog(format!(
                "template name '{name}' uses the reserved '{DEPLOY_PREFIX}' prefix"
            )));
        }
        if self.templates.contains_key(&name) {
            return Err(EngineError::Catalog(format!(
                "template '{name}' registered twice"
            )));
        }
        let functions = probe.functions();
        if functions.is_empty() {
            return Err(EngineError::Catalog(format!(
                "template '{name}' exposes no functions"
            )));
        }
        let mut seen = HashSet::new();
        for function in functions {
            if function.is_empty() {
                return Err(EngineError::Catalog(format!(
                    "template '{name}' exposes an unnamed function"
                )));
            }
            if !seen.insert(*function) {
                return Err(EngineError::Catalog(format!(
                    "template '{name}' lists function '{function}' twice"
                )));
            }
        }
        self.templates.insert(name, factory);
        Ok(())
    }

    /// Registers a plain closure as a template factory.
    pub fn register_fn<F>(&mut self, factory: F) -> Result<(), EngineError>
    where
        F: Fn() -> Box<dyn Contract> + Send + Sync + 'static,
    {
        self.register(Arc::new(factory))
    }

    /// Builds a fresh instance of `template`, if registered.
    #[must_use]
    pub fn instantiate(&self, template: &str) -> Option<Box<dyn Contract>> {
        self.templates.get(template).map(|factory| factory())
    }

    /// Whether a template is registered under `template`.
    #[must_use]
    pub fn contains(&self, template: &str) -> bool {
        self.templates.contains_key(template)
    }

    /// Registered template names, sorted.
    #[must_use]
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
