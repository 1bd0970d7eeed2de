//! # Transaction Scopes
//!
//! A scope is the working set of one transaction: the contract instance
//! buffer, pending deployments, emitted events, and the seeded random stream.
//! Nothing in a scope is durable until the orchestrator commits it.
//!
//! Scopes are keyed by transaction hash in a registry and expire after a TTL,
//! so an abandoned transaction cannot pin contract instances forever.

use crate::contract::ContractCell;
use crate::domain::event::Event;
use crate::domain::metadata::TxMetadata;
use crate::domain::random::Mulberry32;
use crate::errors::ScopeError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default lifetime of an uncommitted scope.
pub const DEFAULT_SCOPE_TTL: Duration = Duration::from_secs(60);

// =============================================================================
// SCOPE
// =============================================================================

/// Per-transaction working set.
pub struct Scope {
    /// Identity of the transaction this scope serves.
    pub metadata: TxMetadata,
    buffer: Mutex<HashMap<String, ContractCell>>,
    deployed: Mutex<Vec<(String, String)>>,
    events: Mutex<Vec<Event>>,
    random: Mutex<Mulberry32>,
    created_at: Instant,
}

impl Scope {
    /// Opens a scope, seeding the random stream from the transaction hash.
    #[must_use]
    pub fn new(metadata: TxMetadata) -> Self {
        let random = Mulberry32::from_hash(&metadata.transaction_hash);
        Self {
            metadata,
            buffer: Mutex::new(HashMap::new()),
            deployed: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            random: Mutex::new(random),
            created_at: Instant::now(),
        }
    }

    /// Transaction hash keying this scope.
    #[must_use]
    pub fn transaction_hash(&self) -> &str {
        &self.metadata.transaction_hash
    }

    /// Returns the buffered instance for `name`, if one was loaded.
    #[must_use]
    pub fn buffered(&self, name: &str) -> Option<ContractCell> {
        self.buffer.lock().get(name).cloned()
    }

    /// Buffers a loaded instance under `name`.
    pub fn insert_contract(&self, name: impl Into<String>, cell: ContractCell) {
        self.buffer.lock().insert(name.into(), cell);
    }

    /// All buffered instances, for commit-time snapshotting.
    #[must_use]
    pub fn buffer_entries(&self) -> Vec<(String, ContractCell)> {
        self.buffer
            .lock()
            .iter()
            .map(|(name, cell)| (name.clone(), Arc::clone(cell)))
            .collect()
    }

    /// Records a deployment pending commit.
    pub fn record_deployment(&self, name: impl Into<String>, template: impl Into<String>) {
        self.deployed.lock().push((name.into(), template.into()));
    }

    /// Template backing a deployment made earlier in this transaction.
    #[must_use]
    pub fn pending_template(&self, name: &str) -> Option<String> {
        self.deployed
            .lock()
            .iter()
            .find(|(deployed, _)| deployed == name)
            .map(|(_, template)| template.clone())
    }

    /// Deployments made by this transaction, in order.
    #[must_use]
    pub fn deployments(&self) -> Vec<(String, String)> {
        self.deployed.lock().clone()
    }

    /// Appends an emitted event.
    pub fn push_event(&self, event: Event) {
        self.events.lock().push(event);
    }

    /// Drains the emitted events for the transaction log.
    #[must_use]
    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Next deterministic random value in `[0, 1)`.
    #[must_use]
    pub fn next_f64(&self) -> f64 {
        self.random.lock().next_f64()
    }

    /// Next deterministic random integer in `[low, high)`.
    #[must_use]
    pub fn next_int(&self, low: u64, high: u64) -> u64 {
        self.random.lock().next_int(low, high)
    }

    /// Whether the scope has outlived `ttl`.
    #[must_use]
    pub fn expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

// =============================================================================
// SCOPE REGISTRY
// =============================================================================

/// Live scopes keyed by transaction hash.
pub struct ScopeRegistry {
    scopes: Mutex<HashMap<String, Arc<Scope>>>,
    ttl: Duration,
}

impl ScopeRegistry {
    /// Creates a registry whose scopes expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            scopes: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Opens a scope for a transaction.
    ///
    /// Expired scopes are swept first; a live scope under the same hash is a
    /// collision, not a replacement.
    pub fn create(&self, metadata: TxMetadata) -> Result<Arc<Scope>, ScopeError> {
        let mut scopes = self.scopes.lock();
        scopes.retain(|_, scope| !scope.expired(self.ttl));
        let hash = metadata.transaction_hash.clone();
        if scopes.contains_key(&hash) {
            return Err(ScopeError::Collision(hash));
        }
        let scope = Arc::new(Scope::new(metadata));
        scopes.insert(hash, Arc::clone(&scope));
        Ok(scope)
    }

    /// Looks up the live scope for a transaction hash.
    pub fn get(&self, transaction_hash: &str) -> Result<Arc<Scope>, ScopeError> {
        let mut scopes = self.scopes.lock();
        match scopes.get(transaction_hash) {
            Some(scope) if scope.expired(self.ttl) => {
                scopes.remove(transaction_hash);
                Err(ScopeError::NotFound(transaction_hash.to_string()))
            }
            Some(scope) => Ok(Arc::clone(scope)),
            None => Err(ScopeError::NotFound(transaction_hash.to_string())),
        }
    }

    /// Removes and returns the scope for a transaction hash.
    pub fn remove(&self, transaction_hash: &str) -> Option<Arc<Scope>> {
        self.scopes.lock().remove(transaction_hash)
    }

    /// Number of live scopes, expired ones included until the next sweep.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.lock().len()
    }

    /// Whether no scopes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.lock().is_empty()
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_TTL)
    }
}

// =============================================================================
// TESTS
// =============================================================================
