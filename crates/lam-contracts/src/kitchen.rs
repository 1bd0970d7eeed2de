//! # Kitchen
//!
//! Single-pool-per-token staking farm. Wallets deposit any registered LRC-20
//! token and accrue LAMBCHOP rewards per block, proportional to their share of
//! the token's staked total. Accounting follows the classic accumulated
//! per-stake pattern: a fixed-point `perStake` accumulator advances on every
//! pool touch, and each position carries a debt marking the accumulator level
//! it has already been paid up to.

use crate::lrc20::{bigint_entries, bigint_map, mismatch, unknown_function};
use crate::token_helper::TokenHelper;
use async_trait::async_trait;
use indexmap::IndexMap;
use lam_engine::codec;
use lam_engine::contract::{CallContext, Contract};
use lam_engine::domain::value::{StateMap, Value, U256};
use lam_engine::errors::{CodecError, ExecutionError};

/// Wallet allowed to administer pools until `setOwner` hands control off.
const KITCHEN_OWNER: &str = "bc1pymguvkanjvxzhwj4m3tdsrsvurj9z237vpwh0uyj6hmaxmnccjeqvej3g4";

/// Token paid out as staking rewards.
const REWARD_TOKEN: &str = "LAMBCHOP";

/// 10 million LAMBCHOP at 4 decimals, minted into the kitchen by `init`.
const INITIAL_REWARD_SUPPLY: u64 = 100_000_000_000;

/// Fixed-point scale of the `perStake` accumulator.
const PER_STAKE_MULTIPLIER: u64 = 100_000_000;

const KITCHEN_FUNCTIONS: &[&str] = &[
    "init",
    "setOwner",
    "setRewardsPerBlock",
    "addNewToken",
    "deposit",
    "withdraw",
    "claim",
    "deposited",
    "rewards",
    "totalDeposited",
    "perBlockRewards",
];

// =============================================================================
// KITCHEN
// =============================================================================

/// One wallet's position in one token pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StakeEntry {
    deposit: U256,
    // deposit * perStake level already settled, scaled by the multiplier
    debt: U256,
}

/// The staking farm contract.
pub struct Kitchen {
    owner: String,
    rewards_per_block: IndexMap<String, U256>,
    // wallet -> token -> position
    user_deposit: IndexMap<String, IndexMap<String, StakeEntry>>,
    total_deposited: IndexMap<String, U256>,
    per_stake: IndexMap<String, U256>,
    last_updated_block: IndexMap<String, u64>,
    initialized: bool,
}

impl Kitchen {
    /// Creates the template instance with no pools.
    #[must_use]
    pub fn new() -> Self {
        Self {
            owner: KITCHEN_OWNER.to_string(),
            rewards_per_block: IndexMap::new(),
            user_deposit: IndexMap::new(),
            total_deposited: IndexMap::new(),
            per_stake: IndexMap::new(),
            last_updated_block: IndexMap::new(),
            initialized: false,
        }
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    async fn init(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        if self.initialized {
            return Err(ExecutionError::contract("init: can only be done once"));
        }
        let token = ctx
            .ecosystem
            .try_contract(REWARD_TOKEN)
            .await?
            .ok_or_else(|| ExecutionError::contract("init: lambchop token not found"))?;
        // The kitchen owns LAMBCHOP, so the rewritten sender passes its gate.
        token
            .call("mint", vec![Value::BigInt(U256::from(INITIAL_REWARD_SUPPLY))])
            .await?;
        self.initialized = true;
        Ok(Value::Null)
    }

    fn only_owner(&self, sender: &str) -> Result<(), ExecutionError> {
        if sender != self.owner {
            return Err(ExecutionError::contract(
                "onlyOwner: only owner can call this method",
            ));
        }
        Ok(())
    }

    fn set_owner(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        self.only_owner(ctx.sender())?;
        let owner: String = ctx.args.arg("setOwner", 0)?;
        self.owner = owner;
        Ok(Value::Null)
    }

    fn set_rewards_per_block(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        self.only_owner(ctx.sender())?;
        let token: String = ctx.args.arg("setRewardsPerBlock", 0)?;
        let rewards: U256 = ctx.args.arg("setRewardsPerBlock", 1)?;
        // Settle the pool at the old rate before the new one takes effect.
        self.update_pool(&token, ctx.block_number())?;
        self.rewards_per_block.insert(token, rewards);
        Ok(Value::Null)
    }

    fn add_new_token(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        self.only_owner(ctx.sender())?;
        let token: String = ctx.args.arg("addNewToken", 0)?;
        let rewards: U256 = ctx.args.arg("addNewToken", 1)?;
        if self.rewards_per_block.contains_key(&token) {
            return Err(ExecutionError::contract("addNewToken: token already exists"));
        }
        self.rewards_per_block.insert(token.clone(), rewards);
        self.last_updated_block.insert(token.clone(), ctx.block_number());
        self.total_deposited.insert(token, U256::zero());
        Ok(Value::Null)
    }

    // =========================================================================
    // STAKING
    // =========================================================================

    async fn deposit(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let token: String = ctx.args.arg("deposit", 0)?;
        let value: U256 = ctx.args.arg("deposit", 1)?;

        self.update_pool(&token, ctx.block_number())?;
        let rewards = self.rewards_for(ctx.sender(), &token)?;
        if !rewards.is_zero() {
            self.claim_for(ctx, &token).await?;
        }

        let helper = TokenHelper::new(token.as_str(), &ctx.ecosystem);
        helper
            .transfer_from(ctx.sender(), ctx.current_contract(), value, true)
            .await?;

        let per_stake = self
            .per_stake
            .get(&token)
            .copied()
            .ok_or_else(|| ExecutionError::contract("deposit: per stake is missing"))?;
        let entry = self
            .user_deposit
            .entry(ctx.sender().to_string())
            .or_default()
            .entry(token.clone())
            .or_default();
        entry.deposit += value;
        entry.debt += value * per_stake;

        let total = self.total_deposited.entry(token).or_insert(U256::zero());
        *total += value;
        Ok(Value::Null)
    }

    async fn withdraw(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let token: String = ctx.args.arg("withdraw", 0)?;

        self.update_pool(&token, ctx.block_number())?;
        let rewards = self.rewards_for(ctx.sender(), &token)?;
        if !rewards.is_zero() {
            self.claim_for(ctx, &token).await?;
        }

        let entry = self
            .user_deposit
            .get(ctx.sender())
            .and_then(|tokens| tokens.get(&token))
            .copied()
            .ok_or_else(|| ExecutionError::contract("withdraw: no deposit found"))?;

        let helper = TokenHelper::new(token.as_str(), &ctx.ecosystem);
        helper.transfer(ctx.sender(), entry.deposit, false).await?;

        if let Some(tokens) = self.user_deposit.get_mut(ctx.sender()) {
            tokens.shift_remove(&token);
        }
        let total = self.total_deposited.get(&token).copied().unwrap_or_default();
        self.total_deposited
            .insert(token, total.saturating_sub(entry.deposit));
        Ok(Value::Null)
    }

    /// Pays out accrued rewards for one position, capped by the kitchen's
    /// LAMBCHOP balance. The position's debt advances by the full accrual
    /// even when the payout was capped.
    async fn claim_for(&mut self, ctx: &CallContext, token: &str) -> Result<(), ExecutionError> {
        self.update_pool(token, ctx.block_number())?;
        let rewards = self.rewards_for(ctx.sender(), token)?;
        if rewards.is_zero() {
            return Err(ExecutionError::contract(
                "claim: no rewards available to claim",
            ));
        }

        let lambchop = TokenHelper::new(REWARD_TOKEN, &ctx.ecosystem);
        let treasury = lambchop.balance_of(ctx.current_contract()).await?;
        let payout = std::cmp::min(rewards, treasury);
        lambchop.transfer(ctx.sender(), payout, false).await?;

        let entry = self
            .user_deposit
            .get_mut(ctx.sender())
            .and_then(|tokens| tokens.get_mut(token))
            .ok_or_else(|| ExecutionError::contract("claim: no deposit found"))?;
        entry.debt += rewards * U256::from(PER_STAKE_MULTIPLIER);
        Ok(())
    }

    // =========================================================================
    // POOL ACCOUNTING
    // =========================================================================

    /// Advances the token's `perStake` accumulator to `block_number`.
    fn update_pool(&mut self, token: &str, block_number: u64) -> Result<(), ExecutionError> {
        let previous = self
            .last_updated_block
            .get(token)
            .copied()
            .ok_or_else(|| ExecutionError::contract("updatePool: no previous updated block"))?;
        let rewards_per_block = self
            .rewards_per_block
            .get(token)
            .copied()
            .ok_or_else(|| {
                ExecutionError::contract("updatePool: not rewards for this token contract")
            })?;
        let total_staked = self
            .total_deposited
            .get(token)
            .copied()
            .ok_or_else(|| ExecutionError::contract("updatePool: total staked is missing"))?;

        let accumulated =
            U256::from(block_number.saturating_sub(previous)) * rewards_per_block;
        let scaled = accumulated * U256::from(PER_STAKE_MULTIPLIER);
        let increment = if total_staked.is_zero() {
            scaled
        } else {
            scaled / total_staked
        };

        let per_stake = self.per_stake.entry(token.to_string()).or_insert(U256::zero());
        *per_stake += increment;
        self.last_updated_block.insert(token.to_string(), block_number);
        Ok(())
    }

    /// Rewards a wallet has accrued up to the current accumulator level.
    fn rewards_for(&self, sender: &str, token: &str) -> Result<U256, ExecutionError> {
        let per_stake = self.per_stake.get(token).copied().ok_or_else(|| {
            ExecutionError::contract("calculateRewardsForSender: perStake is missing")
        })?;
        let Some(entry) = self
            .user_deposit
            .get(sender)
            .and_then(|tokens| tokens.get(token))
        else {
            return Ok(U256::zero());
        };
        Ok((entry.deposit * per_stake).saturating_sub(entry.debt)
            / U256::from(PER_STAKE_MULTIPLIER))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    fn deposited(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let from: String = ctx.args.arg("deposited", 0)?;
        let token: String = ctx.args.arg("deposited", 1)?;
        let deposit = self
            .user_deposit
            .get(&from)
            .and_then(|tokens| tokens.get(&token))
            .map_or_else(U256::zero, |entry| entry.deposit);
        Ok(Value::BigInt(deposit))
    }

    /// Settled rewards plus a projection of the unsettled accrual since the
    /// pool was last touched. The projection goes through f64, so it is an
    /// estimate for very large pools.
    fn rewards(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let from: String = ctx.args.arg("rewards", 0)?;
        let token: String = ctx.args.arg("rewards", 1)?;

        let per_stake = self.per_stake.get(&token).copied().ok_or_else(|| {
            ExecutionError::contract("calculateRewardsForSender: perStake is missing")
        })?;
        let Some(entry) = self
            .user_deposit
            .get(&from)
            .and_then(|tokens| tokens.get(&token))
        else {
            return Ok(Value::BigInt(U256::zero()));
        };
        let until_update = (entry.deposit * per_stake).saturating_sub(entry.debt)
            / U256::from(PER_STAKE_MULTIPLIER);

        let Some(total) = self
            .total_deposited
            .get(&token)
            .copied()
            .filter(|total| !total.is_zero())
        else {
            return Ok(Value::BigInt(U256::zero()));
        };
        let Some(last_update) = self.last_updated_block.get(&token).copied() else {
            return Ok(Value::BigInt(U256::zero()));
        };

        let share = to_f64(entry.deposit) / to_f64(total);
        let per_block = self.rewards_per_block.get(&token).copied().unwrap_or_default();
        let elapsed = ctx.block_number().saturating_sub(last_update);
        Ok(Value::BigInt(until_update + projected(elapsed, per_block, share)))
    }

    fn total_staked(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        // The argument error label for this query is totalStaked, matching the
        // deployed behavior.
        let token: String = ctx.args.arg("totalStaked", 0)?;
        Ok(Value::BigInt(
            self.total_deposited.get(&token).copied().unwrap_or_default(),
        ))
    }

    fn per_block_rewards(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let token: String = ctx.args.arg("perBlockRewards", 0)?;
        Ok(Value::BigInt(
            self.rewards_per_block.get(&token).copied().unwrap_or_default(),
        ))
    }

    fn deposits_value(&self) -> Value {
        Value::Map(
            self.user_deposit
                .iter()
                .map(|(wallet, tokens)| {
                    (
                        Value::Text(wallet.clone()),
                        Value::Map(
                            tokens
                                .iter()
                                .map(|(token, entry)| {
                                    (
                                        Value::Text(token.clone()),
                                        Value::Map(vec![
                                            (
                                                Value::Text("deposit".to_string()),
                                                Value::BigInt(entry.deposit),
                                            ),
                                            (
                                                Value::Text("debt".to_string()),
                                                Value::BigInt(entry.debt),
                                            ),
                                        ]),
                                    )
                                })
                                .collect(),
                        ),
                    )
                })
                .collect(),
        )
    }
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn projected(elapsed: u64, per_block: U256, share: f64) -> U256 {
    let since_update = elapsed as f64 * to_f64(per_block) * share;
    U256::from(since_update.floor().max(0.0) as u128)
}

fn to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

#[async_trait]
impl Contract for Kitchen {
    fn template_name(&self) -> &str {
        "kitchen"
    }

    fn active_on(&self) -> u64 {
        0
    }

    fn functions(&self) -> &'static [&'static str] {
        KITCHEN_FUNCTIONS
    }

    async fn call(&mut self, function: &str, ctx: &CallContext) -> Result<Value, ExecutionError> {
        match function {
            "init" => self.init(ctx).await,
            "setOwner" => self.set_owner(ctx),
            "setRewardsPerBlock" => self.set_rewards_per_block(ctx),
            "addNewToken" => self.add_new_token(ctx),
            "deposit" => self.deposit(ctx).await,
            "withdraw" => self.withdraw(ctx).await,
            "claim" => {
                let token: String = ctx.args.arg("claim", 0)?;
                self.claim_for(ctx, &token).await?;
                Ok(Value::Null)
            }
            "deposited" => self.deposited(ctx),
            "rewards" => self.rewards(ctx),
            "totalDeposited" => self.total_staked(ctx),
            "perBlockRewards" => self.per_block_rewards(ctx),
            _ => Err(unknown_function("kitchen", function)),
        }
    }

    fn state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("owner".to_string(), Value::Text(self.owner.clone()));
        state.insert(
            "rewardsPerBlock".to_string(),
            bigint_map(&self.rewards_per_block),
        );
        state.insert("userDeposit".to_string(), self.deposits_value());
        state.insert(
            "totalDeposited".to_string(),
            bigint_map(&self.total_deposited),
        );
        state.insert("perStake".to_string(), bigint_map(&self.per_stake));
        state.insert(
            "lastUpdatedBlock".to_string(),
            Value::map_from(
                self.last_updated_block
                    .iter()
                    .map(|(token, block)| (token.as_str(), *block)),
            ),
        );
        state.insert("isInitialized".to_string(), Value::Bool(self.initialized));
        state
    }

    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError> {
        if let Some(owner) = codec::text_field(&state, "owner")? {
            self.owner = owner;
        }
        if let Some(entries) = codec::map_field(&state, "rewardsPerBlock")? {
            self.rewards_per_block = bigint_entries(entries, "rewardsPerBlock")?;
        }
        if let Some(entries) = codec::map_field(&state, "userDeposit")? {
            self.user_deposit = stake_entries(entries)?;
        }
        if let Some(entries) = codec::map_field(&state, "totalDeposited")? {
            self.total_deposited = bigint_entries(entries, "totalDeposited")?;
        }
        if let Some(entries) = codec::map_field(&state, "perStake")? {
            self.per_stake = bigint_entries(entries, "perStake")?;
        }
        if let Some(entries) = codec::map_field(&state, "lastUpdatedBlock")? {
            let mut blocks = IndexMap::new();
            for (key, value) in entries {
                let token = key
                    .as_text()
                    .ok_or_else(|| mismatch("lastUpdatedBlock", "text key"))?;
                let block = value
                    .coerce_u64()
                    .ok_or_else(|| mismatch("lastUpdatedBlock", "u64"))?;
                blocks.insert(token.to_string(), block);
            }
            self.last_updated_block = blocks;
        }
        if let Some(flag) = codec::bool_field(&state, "isInitialized")? {
            self.initialized = flag;
        }
        Ok(())
    }
}

// =============================================================================
// STATE PARSING
// =============================================================================

fn stake_entries(
    entries: &[(Value, Value)],
) -> Result<IndexMap<String, IndexMap<String, StakeEntry>>, CodecError> {
    let mut wallets = IndexMap::new();
    for (key, value) in entries {
        let wallet = key
            .as_text()
            .ok_or_else(|| mismatch("userDeposit", "text key"))?;
        let Value::Map(tokens) = value else {
            return Err(mismatch("userDeposit", "map"));
        };
        let mut positions = IndexMap::new();
        for (token_key, entry_value) in tokens {
            let token = token_key
                .as_text()
                .ok_or_else(|| mismatch("userDeposit", "text key"))?;
            positions.insert(token.to_string(), stake_entry(entry_value)?);
        }
        wallets.insert(wallet.to_string(), positions);
    }
    Ok(wallets)
}

fn stake_entry(value: &Value) -> Result<StakeEntry, CodecError> {
    let Value::Map(fields) = value else {
        return Err(mismatch("userDeposit", "stake entry"));
    };
    let mut entry = StakeEntry::default();
    for (key, field) in fields {
        match key.as_text() {
            Some("deposit") => {
                entry.deposit = field
                    .coerce_bigint()
                    .ok_or_else(|| mismatch("userDeposit.deposit", "bigint"))?;
            }
            Some("debt") => {
                entry.debt = field
                    .coerce_bigint()
                    .ok_or_else(|| mismatch("userDeposit.debt", "bigint"))?;
            }
            _ => {}
        }
    }
    Ok(entry)
}

// =============================================================================
// TESTS
// =============================================================================
