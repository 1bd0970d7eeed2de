//! Shared test fixtures: two tiny contracts and a ready-made execution
//! environment over in-memory stores.

use crate::adapters::memory::{MemoryDeployedStore, MemoryStateStore};
use crate::codec;
use crate::contract::{Args, CallContext, Contract, ContractCatalog};
use crate::domain::metadata::{CallFrame, TxMetadata};
use crate::domain::value::{StateMap, Value};
use crate::errors::{CodecError, ExecutionError};
use crate::execution::{Ecosystem, ExecEnv};
use crate::scope::Scope;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

pub(crate) const COUNTER_TEMPLATE: &str = "counter";
pub(crate) const FUTURE_TEMPLATE: &str = "future-counter";
pub(crate) const RELAY_TEMPLATE: &str = "relay";

// =============================================================================
// FIXTURE CONTRACTS
// =============================================================================

/// Counts calls; `whoami` echoes the sender it observed.
pub(crate) struct Counter {
    name: &'static str,
    active_on: u64,
    hits: f64,
}

impl Counter {
    pub(crate) fn new(name: &'static str, active_on: u64) -> Self {
        Self {
            name,
            active_on,
            hits: 0.0,
        }
    }
}

#[async_trait]
impl Contract for Counter {
    fn template_name(&self) -> &str {
        self.name
    }

    fn active_on(&self) -> u64 {
        self.active_on
    }

    fn functions(&self) -> &'static [&'static str] {
        &["bump", "hits", "whoami"]
    }

    async fn call(&mut self, function: &str, ctx: &CallContext) -> Result<Value, ExecutionError> {
        match function {
            "bump" => {
                self.hits += 1.0;
                Ok(Value::Null)
            }
            "hits" => Ok(Value::Number(self.hits)),
            "whoami" => Ok(Value::Text(ctx.sender().to_string())),
            _ => Err(ExecutionError::FunctionNotFound {
                contract: self.name.to_string(),
                function: function.to_string(),
            }),
        }
    }

    fn state(&self) -> StateMap {
        let mut state = IndexMap::new();
        state.insert("hits".to_string(), Value::Number(self.hits));
        state
    }

    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError> {
        if let Some(hits) = codec::number_field(&state, "hits")? {
            self.hits = hits;
        }
        Ok(())
    }
}

/// Stateless contract exercising cross-contract calls and deploys.
pub(crate) struct Relay;

#[async_trait]
impl Contract for Relay {
    fn template_name(&self) -> &str {
        RELAY_TEMPLATE
    }

    fn active_on(&self) -> u64 {
        0
    }

    fn functions(&self) -> &'static [&'static str] {
        &["call_counter", "call_self", "deploy_counter", "emit_and_roll"]
    }

    async fn call(&mut self, function: &str, ctx: &CallContext) -> Result<Value, ExecutionError> {
        match function {
            "call_counter" => {
                ctx.ecosystem
                    .invoke(COUNTER_TEMPLATE, "whoami", Args::default())
                    .await
            }
            "call_self" => {
                ctx.ecosystem
                    .invoke(RELAY_TEMPLATE, "call_self", Args::default())
                    .await
            }
            "deploy_counter" => {
                let name: String = ctx.args.arg("deploy_counter", 0)?;
                let handle = ctx.ecosystem.deploy(COUNTER_TEMPLATE, &name).await?;
                handle.call("bump", Args::default()).await?;
                Ok(Value::Text(handle.name().to_string()))
            }
            "emit_and_roll" => {
                ctx.emit("PING", "relay pinged");
                Ok(Value::Number(ctx.random_f64()))
            }
            _ => Err(ExecutionError::FunctionNotFound {
                contract: RELAY_TEMPLATE.to_string(),
                function: function.to_string(),
            }),
        }
    }

    fn state(&self) -> StateMap {
        IndexMap::new()
    }

    fn load_state(&mut self, _state: StateMap) -> Result<(), CodecError> {
        Ok(())
    }
}

// =============================================================================
// ENVIRONMENT BUILDERS
// =============================================================================

/// An execution environment plus direct handles to its concrete stores.
pub(crate) struct TestEnv {
    pub(crate) env: ExecEnv,
    pub(crate) scope: Arc<Scope>,
    pub(crate) state_store: Arc<MemoryStateStore>,
    pub(crate) deployed_store: Arc<MemoryDeployedStore>,
}

pub(crate) fn test_metadata(hash: &str, block_number: u64) -> TxMetadata {
    TxMetadata {
        sender: "walletA".to_string(),
        origin: "walletA".to_string(),
        transaction_hash: hash.to_string(),
        block_number,
        timestamp: 1_700_000_000,
    }
}

pub(crate) fn test_catalog() -> ContractCatalog {
    let mut catalog = ContractCatalog::new();
    catalog
        .register_fn(|| Box::new(Counter::new(COUNTER_TEMPLATE, 0)))
        .unwrap();
    catalog
        .register_fn(|| Box::new(Counter::new(FUTURE_TEMPLATE, 1_000_000)))
        .unwrap();
    catalog.register_fn(|| Box::new(Relay)).unwrap();
    catalog
}

/// Builds a one-transaction environment at the given block height.
pub(crate) fn test_env(block_number: u64) -> TestEnv {
    let scope = Arc::new(Scope::new(test_metadata("0xtest", block_number)));
    let state_store = Arc::new(MemoryStateStore::new());
    let deployed_store = Arc::new(MemoryDeployedStore::new());
    let env = ExecEnv {
        scope: Arc::clone(&scope),
        catalog: Arc::new(test_catalog()),
        state_store: state_store.clone(),
        deployed_store: deployed_store.clone(),
    };
    TestEnv {
        env,
        scope,
        state_store,
        deployed_store,
    }
}

/// Outermost frame for a wallet-signed call into `contract`.
pub(crate) fn test_frame(fixture: &TestEnv, contract: &str) -> CallFrame {
    fixture.scope.metadata.outer_frame(contract)
}

/// Ecosystem as seen by `contract` executing at the outermost frame.
pub(crate) fn outer_ecosystem(fixture: &TestEnv, contract: &str) -> Ecosystem {
    Ecosystem::new(fixture.env.clone(), test_frame(fixture, contract))
}
