//! # DMT Token Template
//!
//! Never called by its catalog name (its activation height is unreachable);
//! the deployer stamps out aliases and initializes them, after which anyone
//! can mint the per-mint quota once per block until the supply is exhausted.

use crate::lrc20::{mismatch, unknown_function, Lrc20Base};
use async_trait::async_trait;
use indexmap::IndexMap;
use lam_engine::codec;
use lam_engine::contract::{CallContext, Contract};
use lam_engine::domain::value::{StateMap, Value, U256};
use lam_engine::errors::{CodecError, ExecutionError};

const FUNCTIONS: &[&str] = &[
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
    "init",
    "maxSupply",
    "perMint",
];

/// Self-serve token in the DMT mold: fixed cap, fixed mint quota.
pub struct DmtToken {
    base: Lrc20Base,
    initialized: bool,
    max_supply: U256,
    per_mint: U256,
    user_minted_at_block: IndexMap<String, u64>,
}

impl DmtToken {
    /// Creates the uninitialized template instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Lrc20Base::new("DMT", "DMT", 4.0, "0x0"),
            initialized: false,
            max_supply: U256::zero(),
            per_mint: U256::zero(),
            user_minted_at_block: IndexMap::new(),
        }
    }

    fn init(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        if self.initialized {
            return Err(ExecutionError::contract("init: already initialized"));
        }

        let name: String = ctx.args.arg("init", 0)?;
        let symbol: String = ctx.args.arg("init", 1)?;
        let max_supply: U256 = ctx.args.arg("init", 2)?;
        let per_mint: U256 = ctx.args.arg("init", 3)?;

        self.base.set_name(name.clone());
        self.base.set_symbol(symbol);
        self.max_supply = max_supply;
        self.per_mint = per_mint;
        self.initialized = true;

        ctx.emit("INIT", format!("DMT-style token {name} is initialized"));
        Ok(Value::Null)
    }

    fn mint_logic(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let block_number = ctx.block_number();
        let sender = ctx.sender().to_string();

        if self.user_minted_at_block.get(&sender) == Some(&block_number) {
            return Err(ExecutionError::contract(
                "mint: minted more than once this block",
            ));
        }
        self.user_minted_at_block.insert(sender.clone(), block_number);

        let total_supply = self.base.total_supply();
        if total_supply == self.max_supply {
            return Err(ExecutionError::contract("mint: everything minted!"));
        }
        let to_mint = std::cmp::min(self.per_mint, self.max_supply - total_supply);
        self.base.credit(&sender, to_mint);
        self.base.set_total_supply(total_supply + to_mint);

        ctx.emit(
            "TRANSFER",
            format!("FROM: '0x0'; TO: '{sender}'; VALUE: {to_mint}"),
        );
        Ok(Value::Null)
    }
}

impl Default for DmtToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Contract for DmtToken {
    fn template_name(&self) -> &str {
        "dmt-token"
    }

    fn active_on(&self) -> u64 {
        1_000_000_000_000_000
    }

    fn functions(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    async fn call(
        &mut self,
        function: &str,
        ctx: &CallContext,
    ) -> Result<Value, ExecutionError> {
        match function {
            "init" => self.init(ctx),
            "mint" => self.mint_logic(ctx),
            "maxSupply" => Ok(Value::BigInt(self.max_supply)),
            "perMint" => Ok(Value::BigInt(self.per_mint)),
            _ => self
                .base
                .dispatch(function, ctx)
                .unwrap_or_else(|| Err(unknown_function("dmt-token", function))),
        }
    }

    fn state(&self) -> StateMap {
        let mut state = self.base.state();
        state.insert("initialized".to_string(), Value::Bool(self.initialized));
        state.insert("maxSupply".to_string(), Value::BigInt(self.max_supply));
        state.insert("perMint".to_string(), Value::BigInt(self.per_mint));
        state.insert(
            "userMintedAtBlock".to_string(),
            Value::map_from(self.user_minted_at_block.iter().map(|(k, v)| (k.as_str(), *v))),
        );
        state
    }

    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError> {
        self.base.load_state(&state)?;
        if let Some(initialized) = codec::bool_field(&state, "initialized")? {
            self.initialized = initialized;
        }
        if let Some(max_supply) = codec::bigint_field(&state, "maxSupply")? {
            self.max_supply = max_supply;
        }
        if let Some(per_mint) = codec::bigint_field(&state, "perMint")? {
            self.per_mint = per_mint;
        }
        if let Some(entries) = codec::map_field(&state, "userMintedAtBlock")? {
            let mut map = IndexMap::new();
            for (key, value) in entries {
                let key = key
                    .as_text()
                    .ok_or_else(|| mismatch("userMintedAtBlock", "text key"))?;
                let block = value
                    .coerce_u64()
                    .ok_or_else(|| mismatch("userMintedAtBlock", "u64"))?;
                map.insert(key.to_string(), block);
            }
            self.user_minted_at_block = map;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
