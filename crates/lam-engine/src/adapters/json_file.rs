//! # JSON File Stores
//!
//! Durable single-process persistence: contract state, deployments, and the
//! transaction log each live in one JSON document inside a data directory.
//! The directory is flock-guarded so two engines cannot share it, and every
//! write goes through a temp file plus rename so a crash never leaves a
//! half-written document behind.

use crate::codec::StateSnapshot;
use crate::domain::transaction_log::TransactionLogEntry;
use crate::errors::StoreError;
use crate::ports::outbound::{
    ContractStateStore, DeployedContract, DeployedContractsStore, TransactionLogStore,
};
use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "state.json";
const DEPLOYED_FILE: &str = "deployed.json";
const LOG_FILE: &str = "transactions.json";

// =============================================================================
// DATA DIRECTORY LOCK
// =============================================================================

/// Exclusive flock on the data directory, held for the adapter's lifetime.
///
/// The lock file carries the owning PID so a second process failing to
/// acquire can say who holds it.
struct DataDirLock {
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    const LOCK_FILE: &'static str = "LOCK";

    fn acquire(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(Self::LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;
        if file.try_lock_exclusive().is_err() {
            let holder = std::fs::read_to_string(&path)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            return Err(StoreError::Locked(match holder {
                Some(pid) => format!("{} held by process {pid}", data_dir.display()),
                None => data_dir.display().to_string(),
            }));
        }
        let mut locked = file;
        locked.set_len(0)?;
        writeln!(locked, "{}", std::process::id())?;
        locked.sync_all()?;
        Ok(Self { file: locked, path })
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

// =============================================================================
// FILE SHAPES
// =============================================================================

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateFile {
    last_block_number: u64,
    contracts: HashMap<String, StateSnapshot>,
}

// =============================================================================
// JSON FILE STORE
// =============================================================================

/// One data directory exposing all three outbound stores.
///
/// Documents are held in memory and rewritten whole on every mutation; the
/// workloads this engine serves are indexer-sized, not chain-sized.
pub struct JsonFileStore {
    data_dir: PathBuf,
    _lock: DataDirLock,
    state: RwLock<StateFile>,
    deployed: RwLock<Vec<DeployedContract>>,
    log: RwLock<Vec<TransactionLogEntry>>,
}

impl JsonFileStore {
    /// Opens (creating if needed) and locks a data directory.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let lock = DataDirLock::acquire(&data_dir)?;
        let state: StateFile = read_json(&data_dir.join(STATE_FILE))?.unwrap_or_default();
        let deployed: Vec<DeployedContract> =
            read_json(&data_dir.join(DEPLOYED_FILE))?.unwrap_or_default();
        let log: Vec<TransactionLogEntry> =
            read_json(&data_dir.join(LOG_FILE))?.unwrap_or_default();
        Ok(Self {
            data_dir,
            _lock: lock,
            state: RwLock::new(state),
            deployed: RwLock::new(deployed),
            log: RwLock::new(log),
        })
    }

    /// Directory this store persists into.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let path = self.data_dir.join(file);
        let tmp = self.data_dir.join(format!("{file}.tmp"));
        let text =
            serde_json::to_string_pretty(value).map_err(|e| StoreError::Io(e.to_string()))?;
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&text)
        .map_err(|e| StoreError::Corrupted(format!("{}: {e}", path.display())))?;
    Ok(Some(value))
}

#[async_trait]
impl ContractStateStore for JsonFileStore {
    async fn load(&self, name: &str) -> Result<Option<StateSnapshot>, StoreError> {
        Ok(self.state.read().contracts.get(name).cloned())
    }

    async fn store_many(
        &self,
        block_number: u64,
        snapshots: Vec<(String, StateSnapshot)>,
    ) -> Result<(), StoreError> {
        let mut guard = self.state.write();
        guard.last_block_number = block_number;
        for (name, snapshot) in snapshots {
            guard.contracts.insert(name, snapshot);
        }
        self.write_json(STATE_FILE, &*guard)
    }
}

#[async_trait]
impl DeployedContractsStore for JsonFileStore {
    async fn template_of(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .deployed
            .read()
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.template.clone()))
    }

    async fn record(&self, deployment: DeployedContract) -> Result<(), StoreError> {
        let mut guard = self.deployed.write();
        guard.push(deployment);
        self.write_json(DEPLOYED_FILE, &*guard)
    }

    async fn all(&self) -> Result<Vec<DeployedContract>, StoreError> {
        Ok(self.deployed.read().clone())
    }
}

#[async_trait]
impl TransactionLogStore for JsonFileStore {
    async fn append(&self, entry: TransactionLogEntry) -> Result<(), StoreError> {
        let mut guard = self.log.write();
        guard.push(entry);
        self.write_json(LOG_FILE, &*guard)
    }

    async fn all(&self) -> Result<Vec<TransactionLogEntry>, StoreError> {
        Ok(self.log.read().clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
