//! # Contract Loader
//!
//! Resolves a contract name to a live instance inside the current scope.
//! Resolution order: scope buffer, then (for `dep:` names) deployments made
//! earlier in this transaction, then the durable deployment registry, then
//! the template catalog. Freshly built instances absorb their stored
//! snapshot before entering the buffer.

use crate::codec;
use crate::contract::{ContractCell, DEPLOY_PREFIX};
use crate::errors::ExecutionError;
use crate::execution::ExecEnv;
use std::sync::Arc;
use tracing::debug;

/// Returns the buffered instance for `name`, loading it if necessary.
///
/// Within one scope every caller observes the same instance; mutations made
/// by an earlier call in the chain are visible to later ones.
pub async fn load_contract(env: &ExecEnv, name: &str) -> Result<ContractCell, ExecutionError> {
    if let Some(cell) = env.scope.buffered(name) {
        return Ok(cell);
    }

    let template = if name.starts_with(DEPLOY_PREFIX) {
        match env.scope.pending_template(name) {
            Some(template) => template,
            None => env
                .deployed_store
                .template_of(name)
                .await?
                .ok_or_else(|| ExecutionError::ContractNotFound(name.to_string()))?,
        }
    } else {
        name.to_string()
    };

    let mut instance = env
        .catalog
        .instantiate(&template)
        .ok_or_else(|| ExecutionError::ContractNotFound(name.to_string()))?;

    if let Some(snapshot) = env.state_store.load(name).await? {
        let state = codec::decode(&snapshot)?;
        instance.load_state(state)?;
        debug!(contract = %name, template = %template, "restored contract state");
    }

    let cell: ContractCell = Arc::new(tokio::sync::Mutex::new(instance));
    env.scope.insert_contract(name, Arc::clone(&cell));
    Ok(cell)
}

// =============================================================================
// TESTS
// =============================================================================
