//! # Execution Dispatcher
//!
//! Runs one function call against one contract: load, take the instance
//! lock, check activation and dispatchability, then hand control to the
//! contract with a context bound to the caller's frame.

use crate::contract::{Args, CallContext, DEPLOY_PREFIX};
use crate::domain::metadata::CallFrame;
use crate::domain::value::Value;
use crate::errors::ExecutionError;
use crate::execution::{loader, Ecosystem, ExecEnv};
use std::sync::Arc;
use tracing::debug;

/// Executes `function` on the contract named by `frame.current_contract`.
///
/// The instance lock is held for the whole call; a nested call back into the
/// same contract cannot take it and fails as re-entrant instead of
/// deadlocking.
pub async fn execute(
    env: &ExecEnv,
    frame: CallFrame,
    function: &str,
    args: Args,
) -> Result<Value, ExecutionError> {
    let name = frame.current_contract.clone();
    let cell = loader::load_contract(env, &name).await?;
    let mut guard = cell
        .try_lock()
        .map_err(|_| ExecutionError::Reentrant(name.clone()))?;

    // Deployed instances are born mid-chain; the activation height gates
    // templates addressed by their catalog name only.
    if guard.active_on() > frame.block_number && !name.starts_with(DEPLOY_PREFIX) {
        return Err(ExecutionError::NotActive);
    }
    if !guard.functions().contains(&function) {
        return Err(ExecutionError::FunctionNotFound {
            contract: name.clone(),
            function: function.to_string(),
        });
    }

    let ecosystem = Ecosystem::new(env.clone(), frame.clone());
    let ctx = CallContext::new(frame, ecosystem, Arc::clone(&env.scope), args);

    debug!(contract = %name, function, "executing contract function");
    let result = guard.call(function, &ctx).await;
    debug!(contract = %name, function, ok = result.is_ok(), "contract function finished");
    result
}

// =============================================================================
// TESTS
// =============================================================================
