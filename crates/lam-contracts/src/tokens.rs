//! # Stock LRC-20 Tokens
//!
//! LAMBCHOP (the farming reward token), LMDA, and MEOW. Each embeds
//! [`Lrc20Base`] and replaces only the mint policy, plus LMDA's ownership
//! transfer.

use crate::lrc20::{unknown_function, Lrc20Base, LRC20_FUNCTIONS};
use async_trait::async_trait;
use lam_engine::contract::{CallContext, Contract};
use lam_engine::domain::value::{StateMap, Value, U256};
use lam_engine::errors::{CodecError, ExecutionError};

// =============================================================================
// LAMBCHOP
// =============================================================================

/// Reward token farmed by the kitchen; the kitchen contract is its owner and
/// performs the one-time mint during its own `init`.
pub struct Lambchop {
    base: Lrc20Base,
}

impl Lambchop {
    /// Creates the template instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Lrc20Base::new("LAMBCHOP", "LAMBCHOP", 4.0, "kitchen"),
        }
    }

    fn mint_logic(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        if self.base.already_minted() {
            return Err(ExecutionError::contract("mint: already minted"));
        }
        if ctx.sender() != self.base.owner() {
            return Err(ExecutionError::contract("mint: only owner can mint"));
        }

        let to_mint: U256 = ctx.args.arg("mint", 0)?;

        self.base.set_balance(ctx.sender(), to_mint);
        self.base.set_total_supply(to_mint);
        self.base.mark_minted();

        ctx.emit(
            "TRANSFER",
            format!("FROM: '0x0'; TO: '{}'; VALUE: {to_mint}", ctx.sender()),
        );
        Ok(Value::Null)
    }
}

impl Default for Lambchop {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Contract for Lambchop {
    fn template_name(&self) -> &str {
        "LAMBCHOP"
    }

    fn active_on(&self) -> u64 {
        0
    }

    fn functions(&self) -> &'static [&'static str] {
        LRC20_FUNCTIONS
    }

    async fn call(
        &mut self,
        function: &str,
        ctx: &CallContext,
    ) -> Result<Value, ExecutionError> {
        match function {
            "mint" => self.mint_logic(ctx),
            _ => self
                .base
                .dispatch(function, ctx)
                .unwrap_or_else(|| Err(unknown_function("LAMBCHOP", function))),
        }
    }

    fn state(&self) -> StateMap {
        self.base.state()
    }

    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError> {
        self.base.load_state(&state)
    }
}

// =============================================================================
// LMDA
// =============================================================================

const LMDA_FUNCTIONS: &[&str] = &[
    "mint",
    "burn",
    "transfer",
    "transferFrom",
    "approve",
    "name",
    "symbol",
    "decimals",
    "totalSupply",
    "owners",
    "balanceOf",
    "allowance",
    "changeOwner",
];

/// The Lambda token: fixed one-billion supply minted once to the owner, with
/// a transferable ownership.
pub struct Lmda {
    base: Lrc20Base,
}

impl Lmda {
    /// Creates the template instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Lrc20Base::new(
                "Lambda",
                "LMDA",
                8.0,
                "bc1p3dadye5ar65ekxkfh83lmgm2r90mlt5uqx2pfdfl7mdz48trdn8qnnznnu",
            ),
        }
    }

    fn mint_logic(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        if ctx.sender() != self.base.owner() {
            return Err(ExecutionError::contract("mint: only the owner can mint"));
        }
        if self.base.already_minted() {
            return Err(ExecutionError::contract(
                "mint: already minted; can only be done once",
            ));
        }

        // 1 billion with 8 decimals
        let one_billion = U256::from(100_000_000_000_000_000u64);
        self.base.set_balance(ctx.sender(), one_billion);
        self.base.mark_minted();
        self.base.set_total_supply(one_billion);

        ctx.emit(
            "TRANSFER",
            format!("FROM: 0x0; TO: '{}'; VALUE: {one_billion}", ctx.sender()),
        );
        Ok(Value::Null)
    }

    fn change_owner(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let new_owner: String = ctx.args.arg("changeOwner", 0)?;

        if ctx.sender() != self.base.owner() {
            return Err(ExecutionError::contract(
                "only the owner can change the ownership of LMDA",
            ));
        }
        self.base.set_owner(new_owner.clone());

        ctx.emit(
            "CHANGE_OWNERSHIP",
            format!("ownership changed to '{new_owner}'"),
        );
        Ok(Value::Null)
    }
}

impl Default for Lmda {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Contract for Lmda {
    fn template_name(&self) -> &str {
        "LMDA"
    }

    fn active_on(&self) -> u64 {
        828_000
    }

    fn functions(&self) -> &'static [&'static str] {
        LMDA_FUNCTIONS
    }

    async fn call(
        &mut self,
        function: &str,
        ctx: &CallContext,
    ) -> Result<Value, ExecutionError> {
        match function {
            "mint" => self.mint_logic(ctx),
            "changeOwner" => self.change_owner(ctx),
            _ => self
                .base
                .dispatch(function, ctx)
                .unwrap_or_else(|| Err(unknown_function("LMDA", function))),
        }
    }

    fn state(&self) -> StateMap {
        self.base.state()
    }

    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError> {
        self.base.load_state(&state)
    }
}

// =============================================================================
// MEOW
// =============================================================================

/// Meowcoin: the owner may mint any amount to any wallet, repeatedly.
pub struct Meow {
    base: Lrc20Base,
}

impl Meow {
    /// Creates the template instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Lrc20Base::new("Meowcoin", "MEOW", 4.0, "LambFrens"),
        }
    }

    fn mint_logic(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let to: String = ctx.args.arg("mint", 0)?;
        let amount: U256 = ctx.args.arg("mint", 1)?;

        if ctx.sender() != self.base.owner() {
            return Err(ExecutionError::contract("mint: only the owner can mint"));
        }

        self.base.internal_mint(&to, amount, ctx);
        Ok(Value::Null)
    }
}

impl Default for Meow {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Contract for Meow {
    fn template_name(&self) -> &str {
        "MEOW"
    }

    fn active_on(&self) -> u64 {
        834_000
    }

    fn functions(&self) -> &'static [&'static str] {
        LRC20_FUNCTIONS
    }

    async fn call(
        &mut self,
        function: &str,
        ctx: &CallContext,
    ) -> Result<Value, ExecutionError> {
        match function {
            "mint" => self.mint_logic(ctx),
            _ => self
                .base
                .dispatch(function, ctx)
                .unwrap_or_else(|| Err(unknown_function("MEOW", function))),
        }
    }

    fn state(&self) -> StateMap {
        self.base.state()
    }

    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError> {
        self.base.load_state(&state)
    }
}

// =============================================================================
// TESTS
// =============================================================================
