//! # Kitchen Staking Choreography
//!
//! The deepest call chains in the standard suite: a wallet calls the kitchen,
//! the kitchen spends the wallet's token allowance and pays LAMBCHOP rewards.
//! Every hop runs under the rewritten sender of the contract that made it.
//!
//! ## Flows Tested
//!
//! 1. **Init**: the kitchen mints its reward treasury through LAMBCHOP's owner gate
//! 2. **Deposit**: wallet -> kitchen -> token `transferFrom` under the kitchen's name
//! 3. **Accounting**: per-block rewards, rate changes, and share splits
//! 4. **Atomicity**: a failed inner transfer discards the kitchen's own bookkeeping

#[cfg(test)]
mod tests {
    use crate::integration::support::{
        balance_of, engine, error_of, event_message, ok, ok_at, run, run_at, vals, BLOCK,
    };
    use lam_engine::domain::value::U256;
    use lam_engine::prelude::*;
    use serde_json::json;

    const OWNER: &str = "bc1pymguvkanjvxzhwj4m3tdsrsvurj9z237vpwh0uyj6hmaxmnccjeqvej3g4";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Kitchen initialized with a MEOW pool at 100 per block; walletA holds
    /// 1000 MEOW with 500 approved to the kitchen.
    async fn kitchen_engine() -> EngineService {
        let engine = engine();
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
        engine
    }

    async fn deposited(engine: &EngineService, wallet: &str, token: &str) -> U256 {
        engine
            .call_query("kitchen", "deposited", vals(vec![json!(wallet), json!(token)]))
            .await
            .expect("deposited query")
            .coerce_bigint()
            .expect("bigint deposit")
    }

    // =============================================================================
    // INTEGRATION TESTS: INIT
    // =============================================================================

    /// Init mints the whole reward treasury to the kitchen. The mint passes
    /// LAMBCHOP's owner gate, so the token saw the kitchen contract as
    /// sender, not the wallet that sent the inscription.
    #[tokio::test]
    async fn test_init_mints_reward_treasury() {
        let engine = engine();

        let entry = ok(&engine, OWNER, "0xinit", "kitchen", "init", vec![]).await;
        assert_eq!(entry.event_logs.len(), 1);
        assert_eq!(entry.event_logs[0].contract, "LAMBCHOP");
        assert_eq!(
            entry.event_logs[0].message,
            "FROM: '0x0'; TO: 'kitchen'; VALUE: 100000000000"
        );
        assert_eq!(
            balance_of(&engine, "LAMBCHOP", "kitchen").await,
            U256::from(100_000_000_000u64)
        );

        let entry = run(&engine, OWNER, "0xinit2", "kitchen", "init", vec![]).await;
        assert_eq!(error_of(&entry), "init: can only be done once");
    }

    /// Pool administration stays with the owner, and the role is transferable.
    #[tokio::test]
    async fn test_pool_admin_is_owner_gated() {
        let engine = engine();
        ok(&engine, OWNER, "0xinit", "kitchen", "init", vec![]).await;

        let entry = run(
            &engine,
            "walletA",
            "0xrogue",
            "kitchen",
            "addNewToken",
            vec![json!("MEOW"), json!(100)],
        )
        .await;
        assert_eq!(error_of(&entry), "onlyOwner: only owner can call this method");

        ok(&engine, OWNER, "0xhandover", "kitchen", "setOwner", vec![json!("walletZ")]).await;
        ok(
            &engine,
            "walletZ",
            "0xnewowner",
            "kitchen",
            "addNewToken",
            vec![json!("MEOW"), json!(100)],
        )
        .await;

        // The old owner lost the role with the handover.
        let entry = run(
            &engine,
            OWNER,
            "0xold",
            "kitchen",
            "addNewToken",
            vec![json!("LMDA"), json!(5)],
        )
        .await;
        assert_eq!(error_of(&entry), "onlyOwner: only owner can call this method");
    }

    // =============================================================================
    // INTEGRATION TESTS: DEPOSIT CHAIN
    // =============================================================================

    /// Deposit spends the wallet's allowance from inside the kitchen: the
    /// token's transfer event names the wallet and the kitchen, and only the
    /// kitchen's rewritten sender could have passed the allowance check.
    #[tokio::test]
    async fn test_deposit_spends_allowance_under_kitchen_sender() {
        let engine = kitchen_engine().await;

        let entry = ok(
            &engine,
            "walletA",
            "0xdeposit",
            "kitchen",
            "deposit",
            vec![json!("MEOW"), json!(500)],
        )
        .await;
        assert_eq!(entry.event_logs.len(), 1);
        assert_eq!(entry.event_logs[0].contract, "MEOW");
        assert_eq!(
            entry.event_logs[0].message,
            "FROM: 'walletA'; TO: 'kitchen'; VALUE: 500"
        );

        assert_eq!(balance_of(&engine, "MEOW", "walletA").await, U256::from(500u64));
        assert_eq!(balance_of(&engine, "MEOW", "kitchen").await, U256::from(500u64));
        assert_eq!(deposited(&engine, "walletA", "MEOW").await, U256::from(500u64));

        let total = engine
            .call_query("kitchen", "totalDeposited", vals(vec![json!("MEOW")]))
            .await
            .expect("totalDeposited query");
        assert_eq!(total, Value::BigInt(U256::from(500u64)));

        // The allowance is spent.
        let allowance = engine
            .call_query("MEOW", "allowance", vals(vec![json!("walletA"), json!("kitchen")]))
            .await
            .expect("allowance query");
        assert_eq!(allowance.coerce_bigint(), Some(U256::zero()));
    }

    /// A deposit without an allowance fails on the inner transfer and leaves
    /// no trace: no token movement, no stake entry, and no pool accumulator
    /// from the settlement that ran before the transfer.
    #[tokio::test]
    async fn test_deposit_without_allowance_rolls_back_everything() {
        let engine = engine();
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

        let entry = run(
            &engine,
            "walletA",
            "0xdeposit",
            "kitchen",
            "deposit",
            vec![json!("MEOW"), json!(500)],
        )
        .await;
        assert_eq!(error_of(&entry), "transferFrom: allowance for spender not enough");
        assert!(entry.event_logs.is_empty());

        assert_eq!(balance_of(&engine, "MEOW", "walletA").await, U256::from(1000u64));
        assert_eq!(deposited(&engine, "walletA", "MEOW").await, U256::zero());

        // The pool was settled in the buffer before the transfer failed; had
        // that leaked, this query would answer zero instead of failing.
        let err = engine
            .call_query("kitchen", "rewards", vals(vec![json!("walletA"), json!("MEOW")]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "calculateRewardsForSender: perStake is missing");
    }

    // =============================================================================
    // INTEGRATION TESTS: REWARD ACCOUNTING
    // =============================================================================

    /// Ten blocks at 100 per block pay 1000 LAMBCHOP to the only staker.
    #[tokio::test]
    async fn test_claim_pays_per_block_rewards() {
        let engine = kitchen_engine().await;
        ok(
            &engine,
            "walletA",
            "0xdeposit",
            "kitchen",
            "deposit",
            vec![json!("MEOW"), json!(500)],
        )
        .await;

        let entry = ok_at(
            &engine,
            BLOCK + 10,
            "walletA",
            "0xclaim",
            "kitchen",
            "claim",
            vec![json!("MEOW")],
        )
        .await;
        assert_eq!(
            event_message(&entry, "TRANSFER"),
            "FROM: 'kitchen'; TO: 'walletA'; VALUE: 1000"
        );
        assert_eq!(balance_of(&engine, "LAMBCHOP", "walletA").await, U256::from(1000u64));

        // Claiming again in the same block finds nothing accrued.
        let entry = run_at(
            &engine,
            BLOCK + 10,
            "walletA",
            "0xclaim2",
            "kitchen",
            "claim",
            vec![json!("MEOW")],
        )
        .await;
        assert_eq!(error_of(&entry), "claim: no rewards available to claim");
    }

    /// A rate change settles the pool at the old rate before applying the new.
    #[tokio::test]
    async fn test_rate_change_settles_old_rate_first() {
        let engine = kitchen_engine().await;
        ok(
            &engine,
            "walletA",
            "0xdeposit",
            "kitchen",
            "deposit",
            vec![json!("MEOW"), json!(500)],
        )
        .await;

        ok_at(
            &engine,
            BLOCK + 10,
            OWNER,
            "0xrate",
            "kitchen",
            "setRewardsPerBlock",
            vec![json!("MEOW"), json!(200)],
        )
        .await;
        ok_at(
            &engine,
            BLOCK + 20,
            "walletA",
            "0xclaim",
            "kitchen",
            "claim",
            vec![json!("MEOW")],
        )
        .await;

        // 10 blocks at 100, then 10 blocks at 200.
        assert_eq!(balance_of(&engine, "LAMBCHOP", "walletA").await, U256::from(3000u64));
    }

    /// Withdraw pays the accrued rewards and returns the full stake.
    #[tokio::test]
    async fn test_withdraw_returns_stake_and_rewards() {
        let engine = kitchen_engine().await;
        ok(
            &engine,
            "walletA",
            "0xdeposit",
            "kitchen",
            "deposit",
            vec![json!("MEOW"), json!(500)],
        )
        .await;

        let entry = ok_at(
            &engine,
            BLOCK + 5,
            "walletA",
            "0xwithdraw",
            "kitchen",
            "withdraw",
            vec![json!("MEOW")],
        )
        .await;
        // Reward payout first, then the stake itself.
        assert_eq!(entry.event_logs.len(), 2);
        assert_eq!(entry.event_logs[0].contract, "LAMBCHOP");
        assert_eq!(
            entry.event_logs[0].message,
            "FROM: 'kitchen'; TO: 'walletA'; VALUE: 500"
        );
        assert_eq!(entry.event_logs[1].contract, "MEOW");
        assert_eq!(
            entry.event_logs[1].message,
            "FROM: 'kitchen'; TO: 'walletA'; VALUE: 500"
        );

        assert_eq!(balance_of(&engine, "MEOW", "walletA").await, U256::from(1000u64));
        assert_eq!(balance_of(&engine, "LAMBCHOP", "walletA").await, U256::from(500u64));
        assert_eq!(deposited(&engine, "walletA", "MEOW").await, U256::zero());

        let total = engine
            .call_query("kitchen", "totalDeposited", vals(vec![json!("MEOW")]))
            .await
            .expect("totalDeposited query");
        assert_eq!(total, Value::BigInt(U256::zero()));
    }

    /// Two stakers split each block's rewards by stake share from the moment
    /// the second one joins.
    #[tokio::test]
    async fn test_two_stakers_split_by_share() {
        let engine = kitchen_engine().await;
        ok(
            &engine,
            "LambFrens",
            "0xmeowb",
            "MEOW",
            "mint",
            vec![json!("walletB"), json!(500)],
        )
        .await;
        ok(
            &engine,
            "walletB",
            "0xappb",
            "MEOW",
            "approve",
            vec![json!("kitchen"), json!(500)],
        )
        .await;

        ok(
            &engine,
            "walletA",
            "0xdepa",
            "kitchen",
            "deposit",
            vec![json!("MEOW"), json!(500)],
        )
        .await;
        ok_at(
            &engine,
            BLOCK + 10,
            "walletB",
            "0xdepb",
            "kitchen",
            "deposit",
            vec![json!("MEOW"), json!(500)],
        )
        .await;

        ok_at(&engine, BLOCK + 20, "walletA", "0xclma", "kitchen", "claim", vec![json!("MEOW")])
            .await;
        ok_at(&engine, BLOCK + 20, "walletB", "0xclmb", "kitchen", "claim", vec![json!("MEOW")])
            .await;

        // walletA: 10 blocks alone plus 10 blocks at half share.
        assert_eq!(balance_of(&engine, "LAMBCHOP", "walletA").await, U256::from(1500u64));
        assert_eq!(balance_of(&engine, "LAMBCHOP", "walletB").await, U256::from(500u64));
    }
}
