//! # In-Memory Stores
//!
//! Store implementations backed by plain maps. Used by tests and by runs
//! that do not need state to survive the process.

use crate::codec::StateSnapshot;
use crate::domain::transaction_log::TransactionLogEntry;
use crate::errors::StoreError;
use crate::ports::outbound::{
    ContractStateStore, DeployedContract, DeployedContractsStore, TransactionLogStore,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

// =============================================================================
// CONTRACT STATE
// =============================================================================

/// In-memory contract state snapshots.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    snapshots: RwLock<HashMap<String, StateSnapshot>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of contracts with stored state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    /// Whether no state has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }
}

#[async_trait]
impl ContractStateStore for MemoryStateStore {
    async fn load(&self, name: &str) -> Result<Option<StateSnapshot>, StoreError> {
        Ok(self.snapshots.read().get(name).cloned())
    }

    async fn store_many(
        &self,
        _block_number: u64,
        snapshots: Vec<(String, StateSnapshot)>,
    ) -> Result<(), StoreError> {
        let mut guard = self.snapshots.write();
        for (name, snapshot) in snapshots {
            guard.insert(name, snapshot);
        }
        Ok(())
    }
}

// =============================================================================
// DEPLOYED CONTRACTS
// =============================================================================

/// In-memory deployed-contract registry.
#[derive(Debug, Default)]
pub struct MemoryDeployedStore {
    deployments: RwLock<Vec<DeployedContract>>,
}

impl MemoryDeployedStore {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeployedContractsStore for MemoryDeployedStore {
    async fn template_of(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .deployments
            .read()
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.template.clone()))
    }

    async fn record(&self, deployment: DeployedContract) -> Result<(), StoreError> {
        self.deployments.write().push(deployment);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<DeployedContract>, StoreError> {
        Ok(self.deployments.read().clone())
    }
}

// =============================================================================
// TRANSACTION LOG
// =============================================================================

/// In-memory transaction log.
#[derive(Debug, Default)]
pub struct MemoryTransactionLog {
    entries: RwLock<Vec<TransactionLogEntry>>,
}

impl MemoryTransactionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionLogStore for MemoryTransactionLog {
    async fn append(&self, entry: TransactionLogEntry) -> Result<(), StoreError> {
        self.entries.write().push(entry);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<TransactionLogEntry>, StoreError> {
        Ok(self.entries.read().clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
