//! # Engine Service
//!
//! The transaction orchestrator. One inscription becomes one scope, one
//! entry call, and one log entry; buffered state, deployments, and events
//! become durable only if the whole call chain succeeds.

use crate::codec;
use crate::contract::{Args, ContractCatalog, DEPLOY_PREFIX};
use crate::domain::inscription::Inscription;
use crate::domain::metadata::TxMetadata;
use crate::domain::transaction_log::TransactionLogEntry;
use crate::domain::value::{StateMap, Value};
use crate::errors::{EngineError, ExecutionError, StoreError};
use crate::execution::{dispatcher, ExecEnv};
use crate::ports::outbound::{
    ContractStateStore, DeployedContract, DeployedContractsStore, TransactionLogStore,
};
use crate::adapters::memory::{MemoryDeployedStore, MemoryStateStore, MemoryTransactionLog};
use crate::scope::{Scope, ScopeRegistry, DEFAULT_SCOPE_TTL};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Synthetic sender and origin used for read-only queries.
pub const QUERY_SENDER: &str = "query";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lifetime of an uncommitted transaction scope.
    pub scope_ttl: Duration,
    /// Block height read-only queries execute at.
    pub query_block_number: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scope_ttl: DEFAULT_SCOPE_TTL,
            query_block_number: 1_000_000, // past every stock activation height
        }
    }
}

/// Counters describing what the engine has processed.
#[derive(Debug, Default, Clone)]
pub struct EngineStats {
    /// Inscriptions processed to a log entry, either status.
    pub transactions_processed: u64,
    /// Transactions that committed.
    pub successful_transactions: u64,
    /// Transactions logged as ERROR.
    pub failed_transactions: u64,
    /// Read-only queries served.
    pub queries_served: u64,
    /// Deployments committed.
    pub contracts_deployed: u64,
    /// Average processing time in microseconds.
    pub avg_processing_time_us: u64,
}

// =============================================================================
// ENGINE SERVICE
// =============================================================================

/// The contract execution engine.
///
/// Owns the template catalog, the scope registry, and the three durable
/// stores; exposes transaction processing, queries, and read-back.
pub struct EngineService {
    config: EngineConfig,
    catalog: Arc<ContractCatalog>,
    state_store: Arc<dyn ContractStateStore>,
    deployed_store: Arc<dyn DeployedContractsStore>,
    log_store: Arc<dyn TransactionLogStore>,
    scopes: ScopeRegistry,
    stats: Arc<RwLock<EngineStats>>,
}

impl EngineService {
    /// Creates an engine over the given catalog and stores.
    pub fn new(
        catalog: ContractCatalog,
        state_store: Arc<dyn ContractStateStore>,
        deployed_store: Arc<dyn DeployedContractsStore>,
        log_store: Arc<dyn TransactionLogStore>,
        config: EngineConfig,
    ) -> Self {
        let scopes = ScopeRegistry::new(config.scope_ttl);
        Self {
            config,
            catalog: Arc::new(catalog),
            state_store,
            deployed_store,
            log_store,
            scopes,
            stats: Arc::new(RwLock::new(EngineStats::default())),
        }
    }

    /// Creates an engine over in-memory stores.
    #[must_use]
    pub fn in_memory(catalog: ContractCatalog, config: EngineConfig) -> Self {
        Self::new(
            catalog,
            Arc::new(MemoryStateStore::new()),
            Arc::new(MemoryDeployedStore::new()),
            Arc::new(MemoryTransactionLog::new()),
            config,
        )
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current engine statistics.
    pub async fn stats(&self) -> EngineStats {
        self.stats.read().await.clone()
    }

    // =========================================================================
    // TRANSACTION PROCESSING
    // =========================================================================

    /// Parses and processes a raw inscription string.
    pub async fn process_raw(
        &self,
        metadata: TxMetadata,
        raw: &str,
    ) -> Result<TransactionLogEntry, EngineError> {
        let inscription: Inscription = serde_json::from_str(raw)
            .map_err(|e| EngineError::InvalidInscription(e.to_string()))?;
        self.process_inscription(metadata, &inscription).await
    }

    /// Processes one inscription to a transaction log entry.
    ///
    /// Call-chain failures roll the transaction back and are absorbed into an
    /// ERROR entry; only wire validation and integrity violations (scope
    /// lifecycle, store failures) surface as `EngineError`.
    #[instrument(
        skip(self, metadata, inscription),
        fields(
            tx_hash = %metadata.transaction_hash,
            block_number = metadata.block_number,
            contract = %inscription.contract,
            function = %inscription.function,
        )
    )]
    pub async fn process_inscription(
        &self,
        metadata: TxMetadata,
        inscription: &Inscription,
    ) -> Result<TransactionLogEntry, EngineError> {
        inscription.validate()?;

        let start = Instant::now();
        let scope = self.scopes.create(metadata.clone())?;
        let env = self.exec_env(Arc::clone(&scope));
        let frame = metadata.outer_frame(&inscription.contract);
        let args = Args::new(inscription.domain_args());

        let result = dispatcher::execute(&env, frame, &inscription.function, args).await;
        self.scopes.remove(&metadata.transaction_hash);

        let (entry, deployed) = match result {
            Ok(_) => self.commit(&scope, &metadata, inscription).await?,
            Err(ExecutionError::Scope(err)) => return Err(err.into()),
            Err(ExecutionError::Store(err)) => return Err(err.into()),
            Err(err) => {
                warn!(error = %err, "transaction rolled back");
                let entry = TransactionLogEntry::failure(
                    &metadata,
                    inscription.to_log_string(),
                    err.to_string(),
                );
                self.log_store.append(entry.clone()).await?;
                (entry, 0)
            }
        };

        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        {
            let mut stats = self.stats.write().await;
            stats.transactions_processed += 1;
            if entry.is_success() {
                stats.successful_transactions += 1;
            } else {
                stats.failed_transactions += 1;
            }
            stats.contracts_deployed += deployed;
            let total = stats.transactions_processed;
            stats.avg_processing_time_us =
                (stats.avg_processing_time_us * (total - 1) + elapsed_us) / total;
        }
        Ok(entry)
    }

    async fn commit(
        &self,
        scope: &Scope,
        metadata: &TxMetadata,
        inscription: &Inscription,
    ) -> Result<(TransactionLogEntry, u64), EngineError> {
        let mut snapshots = Vec::new();
        for (name, cell) in scope.buffer_entries() {
            // No call frame is live once execution returned, so the instance
            // lock is immediately available.
            let guard = cell.lock().await;
            snapshots.push((name, codec::encode(&guard.state())));
        }
        let touched = snapshots.len();
        self.state_store
            .store_many(metadata.block_number, snapshots)
            .await?;

        let deployments = scope.deployments();
        let deployed = deployments.len() as u64;
        for (name, template) in deployments {
            self.deployed_store
                .record(DeployedContract {
                    name,
                    template,
                    block_number: metadata.block_number,
                })
                .await?;
        }

        let entry = TransactionLogEntry::success(
            metadata,
            &inscription.contract,
            &inscription.function,
            scope.take_events(),
            inscription.to_log_string(),
        );
        self.log_store.append(entry.clone()).await?;
        info!(
            contracts = touched,
            deployed,
            events = entry.event_logs.len(),
            "transaction committed"
        );
        Ok((entry, deployed))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Executes a read-only call and discards the scope.
    ///
    /// Queries run under a synthetic `query` identity at the configured query
    /// block height. Nothing a query does is committed.
    #[instrument(skip(self, args), fields(contract = %contract, function = %function))]
    pub async fn call_query(
        &self,
        contract: &str,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, ExecutionError> {
        let metadata = TxMetadata {
            sender: QUERY_SENDER.to_string(),
            origin: QUERY_SENDER.to_string(),
            transaction_hash: format!("query:{}", Uuid::new_v4()),
            block_number: self.config.query_block_number,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
        };
        let scope = self.scopes.create(metadata.clone())?;
        let env = self.exec_env(Arc::clone(&scope));
        let frame = metadata.outer_frame(contract);

        let result = dispatcher::execute(&env, frame, function, Args::new(args)).await;
        self.scopes.remove(&metadata.transaction_hash);
        self.stats.write().await.queries_served += 1;
        result
    }

    // =========================================================================
    // READ-BACK
    // =========================================================================

    /// Current state of a contract as the loader would see it: a fresh
    /// instance with the latest committed snapshot merged on top.
    ///
    /// Returns `None` when the name resolves to no known template.
    pub async fn contract_state(&self, name: &str) -> Result<Option<StateMap>, EngineError> {
        let template = if name.starts_with(DEPLOY_PREFIX) {
            match self.deployed_store.template_of(name).await? {
                Some(template) => template,
                None => return Ok(None),
            }
        } else {
            name.to_string()
        };
        let Some(mut instance) = self.catalog.instantiate(&template) else {
            return Ok(None);
        };
        if let Some(snapshot) = self.state_store.load(name).await? {
            let state =
                codec::decode(&snapshot).map_err(|e| StoreError::Corrupted(e.to_string()))?;
            instance
                .load_state(state)
                .map_err(|e| StoreError::Corrupted(e.to_string()))?;
        }
        Ok(Some(instance.state()))
    }

    /// All processed transactions, oldest first.
    pub async fn transactions(&self) -> Result<Vec<TransactionLogEntry>, EngineError> {
        Ok(self.log_store.all().await?)
    }

    /// All committed deployments, oldest first.
    pub async fn deployments(&self) -> Result<Vec<DeployedContract>, EngineError> {
        Ok(self.deployed_store.all().await?)
    }

    /// Registered template names, sorted.
    #[must_use]
    pub fn template_names(&self) -> Vec<String> {
        self.catalog.template_names()
    }

    fn exec_env(&self, scope: Arc<Scope>) -> ExecEnv {
        ExecEnv {
            scope,
            catalog: Arc::clone(&self.catalog),
            state_store: Arc::clone(&self.state_store),
            deployed_store: Arc::clone(&self.deployed_store),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
