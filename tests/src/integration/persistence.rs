//! # Persistence Across Restarts
//!
//! The same flows as the in-memory suites, but over [`JsonFileStore`] with a
//! real engine restart in the middle: drop the service, reopen the data
//! directory, and keep processing where the history left off.

#[cfg(test)]
mod tests {
    use crate::integration::support::{balance_of, error_of, ok, ok_at, run_at, BLOCK};
    use lam_contracts::standard_catalog;
    use lam_engine::domain::value::U256;
    use lam_engine::prelude::*;
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    const OWNER: &str = "bc1pymguvkanjvxzhwj4m3tdsrsvurj9z237vpwh0uyj6hmaxmnccjeqvej3g4";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn data_dir(test_name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lam_tests_{}_{}",
            test_name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    /// Engine over one JSON data directory; all three stores share it.
    fn file_engine(dir: &Path) -> EngineService {
        let store = Arc::new(JsonFileStore::open(dir).expect("open data dir"));
        EngineService::new(
            standard_catalog().expect("standard catalog"),
            store.clone(),
            store.clone(),
            store,
            EngineConfig::default(),
        )
    }

    // =============================================================================
    // INTEGRATION TESTS: RESTART CONTINUITY
    // =============================================================================

    /// Balances, deployments, and the transaction log survive a restart, and
    /// the reopened engine keeps processing on top of them.
    #[tokio::test]
    async fn test_history_survives_restart() {
        let dir = data_dir("history");
        {
            let engine = file_engine(&dir);
            ok(&engine, "protocol", "0x1", "bitcoin", "mint", vec![json!("walletA"), json!(10000)])
                .await;
            ok(
                &engine,
                "walletA",
                "0x2",
                "dmt-deployer",
                "deploy",
                vec![json!("Pepe Token"), json!("PEPE"), json!(1000), json!(300)],
            )
            .await;
            ok(&engine, "walletB", "0x3", "dep:dmt:PEPE", "mint", vec![]).await;
        }

        let engine = file_engine(&dir);
        assert_eq!(balance_of(&engine, "bitcoin", "walletA").await, U256::from(10000u64));
        assert_eq!(
            balance_of(&engine, "dep:dmt:PEPE", "walletB").await,
            U256::from(300u64)
        );

        let log = engine.transactions().await.expect("log");
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(TransactionLogEntry::is_success));
        assert_eq!(log[0].transaction_hash, "0x1");

        let deployments = engine.deployments().await.expect("deployments");
        assert_eq!(deployments.len(), 1);
        assert_eq!(deployments[0].name, "dep:dmt:PEPE");

        // History continues where it left off.
        ok(&engine, "walletA", "0x4", "bitcoin", "transfer", vec![json!("walletB"), json!(400)])
            .await;
        assert_eq!(balance_of(&engine, "bitcoin", "walletB").await, U256::from(400u64));
        assert_eq!(engine.transactions().await.expect("log").len(), 4);

        drop(engine);
        let _ = std::fs::remove_dir_all(&dir);
    }

    /// The kitchen's nested bookkeeping round-trips the data directory: a
    /// stake made before the restart accrues and pays out after it.
    #[tokio::test]
    async fn test_staking_resumes_across_restart() {
        let dir = data_dir("staking");
        {
            let engine = file_engine(&dir);
            ok(&engine, OWNER, "0xinit", "kitchen", "init", vec![]).await;
            ok(
                &engine,
                OWNER,
                "0xadd",
                "kitchen",
                "addNewToken",
                vec![json!("MEOW"), json!(100)],
            )
            .await;
            ok(
                &engine,
                "LambFrens",
                "0xmeow",
                "MEOW",
                "mint",
                vec![json!("walletA"), json!(1000)],
            )
            .await;
            ok(
                &engine,
                "walletA",
                "0xapprove",
                "MEOW",
                "approve",
                vec![json!("kitchen"), json!(500)],
            )
            .await;
            ok(
                &engine,
                "walletA",
                "0xdeposit",
                "kitchen",
                "deposit",
                vec![json!("MEOW"), json!(500)],
            )
            .await;
        }

        let engine = file_engine(&dir);
        ok_at(
            &engine,
            BLOCK + 10,
            "walletA",
            "0xclaim",
            "kitchen",
            "claim",
            vec![json!("MEOW")],
        )
        .await;
        assert_eq!(balance_of(&engine, "LAMBCHOP", "walletA").await, U256::from(1000u64));

        drop(engine);
        let _ = std::fs::remove_dir_all(&dir);
    }

    /// The per-wallet mint guard persists, so a restart does not reopen a
    /// block's quota.
    #[tokio::test]
    async fn test_mint_quota_survives_restart() {
        let dir = data_dir("quota");
        {
            let engine = file_engine(&dir);
            ok(
                &engine,
                "walletA",
                "0xdeploy",
                "dmt-deployer",
                "deploy",
                vec![json!("Pepe Token"), json!("PEPE"), json!(1000), json!(300)],
            )
            .await;
            ok_at(&engine, BLOCK + 1, "walletB", "0xm1", "dep:dmt:PEPE", "mint", vec![]).await;
        }

        let engine = file_engine(&dir);
        let entry = run_at(&engine, BLOCK + 1, "walletB", "0xm2", "dep:dmt:PEPE", "mint", vec![])
            .await;
        assert_eq!(error_of(&entry), "mint: minted more than once this block");

        ok_at(&engine, BLOCK + 2, "walletB", "0xm3", "dep:dmt:PEPE", "mint", vec![]).await;
        assert_eq!(
            balance_of(&engine, "dep:dmt:PEPE", "walletB").await,
            U256::from(600u64)
        );

        drop(engine);
        let _ = std::fs::remove_dir_all(&dir);
    }

    // =============================================================================
    // INTEGRATION TESTS: DATA DIRECTORY LOCKING
    // =============================================================================

    /// A live engine holds the data directory exclusively.
    #[test]
    fn test_data_dir_is_exclusive() {
        let dir = data_dir("exclusive");
        let engine = file_engine(&dir);

        let second = JsonFileStore::open(&dir);
        assert!(matches!(second, Err(StoreError::Locked(_))));

        // Dropping the engine drops the store and releases the lock.
        drop(engine);
        assert!(JsonFileStore::open(&dir).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
