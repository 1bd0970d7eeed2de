//! # Execution Core
//!
//! Contract loading, cross-contract calls, and function dispatch. Everything
//! here operates inside one transaction scope; durability happens later, in
//! the orchestrator.

pub mod dispatcher;
pub mod ecosystem;
pub mod loader;

pub use dispatcher::*;
pub use ecosystem::*;
pub use loader::*;

use crate::contract::ContractCatalog;
use crate::ports::outbound::{ContractStateStore, DeployedContractsStore};
use crate::scope::Scope;
use std::sync::Arc;

/// Shared handles every execution step needs.
///
/// Cheap to clone; all members are behind `Arc`.
#[derive(Clone)]
pub struct ExecEnv {
    /// Working set of the transaction being executed.
    pub scope: Arc<Scope>,
    /// Registered contract templates.
    pub catalog: Arc<ContractCatalog>,
    /// Durable contract state, read at load time.
    pub state_store: Arc<dyn ContractStateStore>,
    /// Durable deployment registry, read during name resolution.
    pub deployed_store: Arc<dyn DeployedContractsStore>,
}
