//! # Ecosystem
//!
//! The cross-contract surface handed to an executing contract: invoke other
//! contracts, obtain bound handles, and deploy new instances from templates.
//! Every operation runs under a child frame, so the callee always sees the
//! calling contract as its sender.

use crate::contract::{Args, DEPLOY_PREFIX};
use crate::domain::event::Event;
use crate::domain::metadata::CallFrame;
use crate::domain::value::Value;
use crate::errors::ExecutionError;
use crate::execution::{dispatcher, loader, ExecEnv};

/// Event kind recorded when a contract deploys another contract.
pub const DEPLOY_EVENT: &str = "DEPLOY";

// =============================================================================
// ECOSYSTEM
// =============================================================================

/// Cross-contract operations bound to one call frame.
#[derive(Clone)]
pub struct Ecosystem {
    env: ExecEnv,
    frame: CallFrame,
}

impl Ecosystem {
    pub(crate) fn new(env: ExecEnv, frame: CallFrame) -> Self {
        Self { env, frame }
    }

    /// Calls a function on another contract.
    ///
    /// The callee's sender is the currently executing contract, never the
    /// original wallet.
    pub async fn invoke(
        &self,
        contract: &str,
        function: &str,
        args: impl Into<Args> + Send,
    ) -> Result<Value, ExecutionError> {
        let child = self.frame.child(contract);
        dispatcher::execute(&self.env, child, function, args.into()).await
    }

    /// Returns a handle bound to `name` without touching it.
    #[must_use]
    pub fn contract(&self, name: &str) -> ContractHandle {
        ContractHandle {
            env: self.env.clone(),
            frame: self.frame.clone(),
            name: name.to_string(),
        }
    }

    /// Returns a handle only if `name` resolves to a loadable contract.
    pub async fn try_contract(&self, name: &str) -> Result<Option<ContractHandle>, ExecutionError> {
        match loader::load_contract(&self.env, name).await {
            Ok(_) => Ok(Some(self.contract(name))),
            Err(ExecutionError::ContractNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Deploys a fresh instance of `template` under `dep:<name>`.
    ///
    /// The deployment is buffered in the scope and only becomes durable when
    /// the transaction commits; within this transaction the returned handle
    /// is already callable.
    pub async fn deploy(
        &self,
        template: &str,
        name: &str,
    ) -> Result<ContractHandle, ExecutionError> {
        if name.is_empty() {
            return Err(ExecutionError::InvalidDeployName(
                "name cant be empty".to_string(),
            ));
        }
        if name.contains('.') {
            return Err(ExecutionError::InvalidDeployName(
                "'.' is not allowed in contract name".to_string(),
            ));
        }
        if name.contains(DEPLOY_PREFIX) {
            return Err(ExecutionError::InvalidDeployName(format!(
                "'{DEPLOY_PREFIX}' prefix is reserved"
            )));
        }
        if !self.env.catalog.contains(template) {
            return Err(ExecutionError::ContractNotFound(template.to_string()));
        }

        let full = format!("{DEPLOY_PREFIX}{name}");
        let taken = self.env.catalog.contains(name)
            || self.env.scope.pending_template(&full).is_some()
            || self.env.deployed_store.contains(&full).await?;
        if taken {
            return Err(ExecutionError::AlreadyDeployed(name.to_string()));
        }

        self.env.scope.record_deployment(&full, template);
        self.env.scope.push_event(Event::new(
            DEPLOY_EVENT,
            format!("contract '{full}' has been deployed!"),
            self.frame.current_contract.clone(),
        ));
        Ok(self.contract(&full))
    }
}

// =============================================================================
// CONTRACT HANDLE
// =============================================================================

/// A callable reference to one contract, bound to the frame that obtained it.
pub struct ContractHandle {
    env: ExecEnv,
    frame: CallFrame,
    name: String,
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ContractHandle {
    /// Full name the handle addresses.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls a function on the referenced contract.
    pub async fn call(
        &self,
        function: &str,
        args: impl Into<Args> + Send,
    ) -> Result<Value, ExecutionError> {
        let child = self.frame.child(&self.name);
        dispatcher::execute(&self.env, child, function, args.into()).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
