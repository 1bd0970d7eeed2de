//! # Wire-to-Commit Flows
//!
//! End-to-end tests through the public engine surface: raw inscription text
//! in, committed state and transaction log entries out.
//!
//! ## Flows Tested
//!
//! 1. **Wire parsing**: protocol and op literals gate what reaches execution
//! 2. **Commit/rollback**: a transaction lands whole or leaves only an ERROR entry
//! 3. **Determinism**: the same inscription sequence replays to identical state
//! 4. **Queries**: read-only calls leave no trace in state or log

#[cfg(test)]
mod tests {
    use crate::integration::support::{
        balance_of, engine, error_of, meta, run, vals, BLOCK,
    };
    use lam_engine::domain::value::U256;
    use lam_engine::prelude::*;
    use serde_json::json;

    // =============================================================================
    // INTEGRATION TESTS: RAW WIRE INPUT
    // =============================================================================

    /// A raw inscription string parses, executes, and commits in one pass.
    #[tokio::test]
    async fn test_raw_mint_commits_state_and_log() {
        let engine = engine();

        let raw = r#"{"p":"lam","op":"call","contract":"bitcoin","function":"mint","args":["walletA",10000]}"#;
        let entry = engine
            .process_raw(meta("protocol", "0xmint", BLOCK), raw)
            .await
            .expect("raw inscription processes");

        // The entry carries the anchoring metadata verbatim.
        assert!(entry.is_success());
        assert_eq!(entry.sender, "protocol");
        assert_eq!(entry.origin, "protocol");
        assert_eq!(entry.transaction_hash, "0xmint");
        assert_eq!(entry.block_number, BLOCK);
        assert_eq!(entry.timestamp, 1_700_000_000);
        assert_eq!(entry.current_contract.as_deref(), Some("bitcoin"));
        assert_eq!(entry.method.as_deref(), Some("mint"));

        assert_eq!(entry.event_logs.len(), 1);
        assert_eq!(entry.event_logs[0].kind, "TRANSFER");
        assert_eq!(entry.event_logs[0].contract, "bitcoin");
        assert_eq!(
            entry.event_logs[0].message,
            "FROM: '0x0'; TO: 'walletA'; VALUE: 10000"
        );

        // The embedded inscription round-trips back to the wire form.
        let embedded: Inscription =
            serde_json::from_str(&entry.inscription).expect("embedded inscription parses");
        assert_eq!(embedded.contract, "bitcoin");
        assert_eq!(embedded.args, vec![json!("walletA"), json!(10000)]);

        assert_eq!(balance_of(&engine, "bitcoin", "walletA").await, U256::from(10000u64));
        assert_eq!(engine.transactions().await.expect("log").len(), 1);
    }

    /// Foreign protocols and malformed text never reach execution or the log.
    #[tokio::test]
    async fn test_raw_wire_rejects_foreign_input() {
        let engine = engine();

        let foreign = r#"{"p":"brc-20","op":"call","contract":"bitcoin","function":"mint","args":[]}"#;
        let err = engine
            .process_raw(meta("protocol", "0xforeign", BLOCK), foreign)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInscription(_)));

        let foreign_op = r#"{"p":"lam","op":"deploy","contract":"bitcoin","function":"mint","args":[]}"#;
        let err = engine
            .process_raw(meta("protocol", "0xop", BLOCK), foreign_op)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInscription(_)));

        let err = engine
            .process_raw(meta("protocol", "0xgarbage", BLOCK), "not an inscription")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInscription(_)));

        // Rejected wire input is not a transaction; nothing was logged.
        assert!(engine.transactions().await.expect("log").is_empty());
    }

    // =============================================================================
    // INTEGRATION TESTS: COMMIT AND ROLLBACK
    // =============================================================================

    /// A failed call becomes an ERROR entry and commits no state or events.
    #[tokio::test]
    async fn test_failed_call_logs_error_and_commits_nothing() {
        let engine = engine();

        let entry = run(
            &engine,
            "walletA",
            "0xdenied",
            "bitcoin",
            "mint",
            vec![json!("walletA"), json!(10000)],
        )
        .await;

        assert!(!entry.is_success());
        assert_eq!(error_of(&entry), "mint: only the protocol wallet can mint bitcoin");
        // Failed entries carry no entry point and no events.
        assert!(entry.current_contract.is_none());
        assert!(entry.method.is_none());
        assert!(entry.event_logs.is_empty());

        assert_eq!(balance_of(&engine, "bitcoin", "walletA").await, U256::zero());
        assert_eq!(engine.transactions().await.expect("log").len(), 1);
    }

    /// Unknown contracts and functions are execution failures, not wire errors.
    #[tokio::test]
    async fn test_unknown_targets_are_logged_errors() {
        let engine = engine();

        let entry = run(&engine, "walletA", "0xnope", "nope", "mint", vec![]).await;
        assert_eq!(error_of(&entry), "contract nope not found!");

        let entry = run(&engine, "walletA", "0xfly", "bitcoin", "fly", vec![]).await;
        assert_eq!(
            error_of(&entry),
            "execution: function 'fly' does not exist on contract 'bitcoin'"
        );

        assert_eq!(engine.transactions().await.expect("log").len(), 2);
    }

    /// A full token day: mint, transfer, an overdraft failure, then an
    /// allowance spend; balances always reflect exactly the committed entries.
    #[tokio::test]
    async fn test_token_lifecycle_balances_follow_the_log() {
        let engine = engine();

        run(&engine, "protocol", "0x1", "bitcoin", "mint", vec![json!("walletA"), json!(500)])
            .await;
        run(&engine, "walletA", "0x2", "bitcoin", "transfer", vec![json!("walletB"), json!(100)])
            .await;

        let entry = run(
            &engine,
            "walletB",
            "0x3",
            "bitcoin",
            "transfer",
            vec![json!("walletC"), json!(101)],
        )
        .await;
        assert_eq!(error_of(&entry), "transfer: balance too small");

        run(&engine, "walletA", "0x4", "bitcoin", "approve", vec![json!("walletB"), json!(50)])
            .await;
        run(
            &engine,
            "walletB",
            "0x5",
            "bitcoin",
            "transferFrom",
            vec![json!("walletA"), json!("walletC"), json!(30)],
        )
        .await;

        assert_eq!(balance_of(&engine, "bitcoin", "walletA").await, U256::from(370u64));
        assert_eq!(balance_of(&engine, "bitcoin", "walletB").await, U256::from(100u64));
        assert_eq!(balance_of(&engine, "bitcoin", "walletC").await, U256::from(30u64));

        let allowance = engine
            .call_query("bitcoin", "allowance", vals(vec![json!("walletA"), json!("walletB")]))
            .await
            .expect("allowance query");
        assert_eq!(allowance.coerce_bigint(), Some(U256::from(20u64)));

        let log = engine.transactions().await.expect("log");
        assert_eq!(log.len(), 5);
        assert_eq!(log.iter().filter(|e| e.is_success()).count(), 4);
    }

    // =============================================================================
    // INTEGRATION TESTS: DETERMINISM
    // =============================================================================

    /// Two engines fed the same inscription sequence produce identical logs
    /// and identical committed state.
    #[tokio::test]
    async fn test_identical_inputs_replay_identically() {
        let first = engine();
        let second = engine();

        for engine in [&first, &second] {
            run(engine, "protocol", "0xa", "bitcoin", "mint", vec![json!("walletA"), json!(900)])
                .await;
            run(engine, "walletA", "0xb", "bitcoin", "transfer", vec![json!("walletB"), json!(250)])
                .await;
            // A failure is part of the replayed history too.
            run(engine, "walletB", "0xc", "bitcoin", "transfer", vec![json!("walletC"), json!(999)])
                .await;
            run(
                engine,
                "walletA",
                "0xd",
                "dmt-deployer",
                "deploy",
                vec![json!("Pepe Token"), json!("PEPE"), json!(1000), json!(300)],
            )
            .await;
        }

        assert_eq!(
            first.transactions().await.expect("log"),
            second.transactions().await.expect("log")
        );
        assert_eq!(
            first.deployments().await.expect("deployments"),
            second.deployments().await.expect("deployments")
        );
        assert_eq!(
            first.contract_state("bitcoin").await.expect("state"),
            second.contract_state("bitcoin").await.expect("state")
        );
    }

    // =============================================================================
    // INTEGRATION TESTS: READ-ONLY QUERIES
    // =============================================================================

    /// Queries answer from committed state without writing anything.
    #[tokio::test]
    async fn test_queries_leave_no_trace() {
        let engine = engine();
        run(&engine, "protocol", "0xq", "bitcoin", "mint", vec![json!("walletA"), json!(77)])
            .await;

        assert_eq!(balance_of(&engine, "bitcoin", "walletA").await, U256::from(77u64));
        let name = engine
            .call_query("bitcoin", "name", vec![])
            .await
            .expect("name query");
        assert_eq!(name, Value::Text("Protocol Bitcoin".to_string()));

        // Still exactly the one processed transaction.
        assert_eq!(engine.transactions().await.expect("log").len(), 1);

        let stats = engine.stats().await;
        assert_eq!(stats.transactions_processed, 1);
        assert_eq!(stats.queries_served, 2);
    }

    /// Mutating functions run under a query sender fail like any other caller.
    #[tokio::test]
    async fn test_queries_cannot_impersonate_wallets() {
        let engine = engine();
        run(&engine, "protocol", "0xm", "bitcoin", "mint", vec![json!("walletA"), json!(10)])
            .await;

        let err = engine
            .call_query("bitcoin", "transfer", vals(vec![json!("walletB"), json!(5)]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "transfer: balance too small");
        assert_eq!(balance_of(&engine, "bitcoin", "walletA").await, U256::from(10u64));
    }

    // =============================================================================
    // INTEGRATION TESTS: LOG FORMAT
    // =============================================================================

    /// The serialized log entry keeps the external JSON shape consumers read.
    #[tokio::test]
    async fn test_log_entry_wire_shape() {
        let engine = engine();

        let entry = run(
            &engine,
            "protocol",
            "0xshape",
            "bitcoin",
            "mint",
            vec![json!("walletA"), json!(1)],
        )
        .await;
        let log = serde_json::to_value(&entry).expect("entry serializes");
        assert_eq!(log["status"], "SUCCESS");
        assert_eq!(log["transactionHash"], "0xshape");
        assert_eq!(log["blockNumber"], 840_000);
        assert_eq!(log["currentContract"], "bitcoin");
        assert_eq!(log["method"], "mint");
        assert_eq!(log["eventLogs"][0]["type"], "TRANSFER");

        let entry = run(&engine, "walletA", "0xerr", "bitcoin", "mint", vec![json!("x"), json!(1)])
            .await;
        let log = serde_json::to_value(&entry).expect("entry serializes");
        assert_eq!(log["status"], "ERROR");
        assert_eq!(log["errorMessage"], "mint: only the protocol wallet can mint bitcoin");
        // Failed entries omit the entry point keys entirely.
        assert!(log.get("currentContract").is_none());
        assert!(log.get("method").is_none());
    }

    // =============================================================================
    // INTEGRATION TESTS: ENGINE STATS
    // =============================================================================

    #[tokio::test]
    async fn test_stats_track_outcomes() {
        let engine = engine();

        run(&engine, "protocol", "0x1", "bitcoin", "mint", vec![json!("walletA"), json!(5)]).await;
        run(&engine, "walletA", "0x2", "bitcoin", "transfer", vec![json!("walletB"), json!(2)])
            .await;
        run(&engine, "walletB", "0x3", "bitcoin", "transfer", vec![json!("walletC"), json!(99)])
            .await;
        run(
            &engine,
            "walletA",
            "0x4",
            "dmt-deployer",
            "deploy",
            vec![json!("Pepe Token"), json!("PEPE"), json!(1000), json!(300)],
        )
        .await;

        let stats = engine.stats().await;
        assert_eq!(stats.transactions_processed, 4);
        assert_eq!(stats.successful_transactions, 3);
        assert_eq!(stats.failed_transactions, 1);
        assert_eq!(stats.contracts_deployed, 1);
        assert_eq!(stats.queries_served, 0);
    }
}
