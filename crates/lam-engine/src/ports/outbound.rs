//! # Driven Ports (Outbound)
//!
//! Interfaces the engine depends on for durability: contract state
//! snapshots, the deployed-contract registry, and the transaction log.
//! Adapters implement these; the execution core never sees a concrete store.

use crate::codec::StateSnapshot;
use crate::domain::transaction_log::TransactionLogEntry;
use crate::errors::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// DEPLOYED CONTRACT RECORD
// =============================================================================

/// One committed deployment: a named instance bound to its template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    /// Full instance name, `dep:` prefix included.
    pub name: String,
    /// Catalog template the instance is built from.
    pub template: String,
    /// Block of the transaction that deployed it.
    pub block_number: u64,
}

// =============================================================================
// CONTRACT STATE STORE
// =============================================================================

/// Durable storage for contract state snapshots, keyed by contract name.
///
/// `store_many` must apply one transaction's snapshots as a unit; a committed
/// transaction never persists partially.
#[async_trait]
pub trait ContractStateStore: Send + Sync {
    /// Loads the latest snapshot for a contract name.
    async fn load(&self, name: &str) -> Result<Option<StateSnapshot>, StoreError>;

    /// Stores the snapshots of every contract touched by one transaction.
    async fn store_many(
        &self,
        block_number: u64,
        snapshots: Vec<(String, StateSnapshot)>,
    ) -> Result<(), StoreError>;

    /// Stores a single snapshot.
    async fn store(
        &self,
        block_number: u64,
        name: String,
        snapshot: StateSnapshot,
    ) -> Result<(), StoreError> {
        self.store_many(block_number, vec![(name, snapshot)]).await
    }
}

// =============================================================================
// DEPLOYED CONTRACTS STORE
// =============================================================================

/// Durable registry of deployed contract instances.
#[async_trait]
pub trait DeployedContractsStore: Send + Sync {
    /// Template backing a deployed name, if any.
    async fn template_of(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Records a committed deployment.
    async fn record(&self, deployment: DeployedContract) -> Result<(), StoreError>;

    /// All committed deployments, oldest first.
    async fn all(&self) -> Result<Vec<DeployedContract>, StoreError>;

    /// Whether a deployed name is taken.
    async fn contains(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.template_of(name).await?.is_some())
    }
}

// =============================================================================
// TRANSACTION LOG STORE
// =============================================================================

/// Append-only record of processed transactions.
#[async_trait]
pub trait TransactionLogStore: Send + Sync {
    /// Appends one entry.
    async fn append(&self, entry: TransactionLogEntry) -> Result<(), StoreError>;

    /// All entries, oldest first.
    async fn all(&self) -> Result<Vec<TransactionLogEntry>, StoreError>;

    /// Number of logged transactions.
    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.all().await?.len())
    }
}
