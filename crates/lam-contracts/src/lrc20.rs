//! # LRC-20 Base Token
//!
//! Reusable fungible-token core. Concrete tokens embed [`Lrc20Base`], route
//! the shared function set through [`Lrc20Base::dispatch`], and override the
//! mint/burn policy hooks with their own rules.

use indexmap::IndexMap;
use lam_engine::codec;
use lam_engine::contract::CallContext;
use lam_engine::domain::value::{StateMap, Value, U256};
use lam_engine::errors::{CodecError, ExecutionError};

/// Functions every LRC-20 token answers.
pub const LRC20_FUNCTIONS: &[&str] = &[
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
];

/// Builds the dispatcher-shaped error for a name outside a contract's set.
pub(crate) fn unknown_function(contract: &str, function: &str) -> ExecutionError {
    ExecutionError::FunctionNotFound {
        contract: contract.to_string(),
        function: function.to_string(),
    }
}

// =============================================================================
// BASE TOKEN
// =============================================================================

/// Embeddable LRC-20 core: identity, supply, balances, and allowances.
#[derive(Debug, Clone)]
pub struct Lrc20Base {
    name: String,
    symbol: String,
    decimals: f64,
    owner: String,
    already_minted: bool,
    total_supply: U256,
    // owner -> spender -> allowance
    allowance: IndexMap<String, IndexMap<String, U256>>,
    balance: IndexMap<String, U256>,
}

impl Lrc20Base {
    /// Creates a token core with an empty ledger.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: f64,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            owner: owner.into(),
            already_minted: false,
            total_supply: U256::zero(),
            allowance: IndexMap::new(),
            balance: IndexMap::new(),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Token name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the token name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Token symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Replaces the token symbol.
    pub fn set_symbol(&mut self, symbol: impl Into<String>) {
        self.symbol = symbol.into();
    }

    /// Current owner wallet.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Replaces the owner wallet.
    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.owner = owner.into();
    }

    /// Whether the one-time mint already happened.
    #[must_use]
    pub fn already_minted(&self) -> bool {
        self.already_minted
    }

    /// Marks the one-time mint as done.
    pub fn mark_minted(&mut self) {
        self.already_minted = true;
    }

    /// Total circulating supply.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Overwrites the total supply.
    pub fn set_total_supply(&mut self, supply: U256) {
        self.total_supply = supply;
    }

    /// Balance of a wallet, zero when unknown.
    #[must_use]
    pub fn balance_of(&self, wallet: &str) -> U256 {
        self.balance.get(wallet).copied().unwrap_or_default()
    }

    /// Overwrites a wallet balance.
    pub fn set_balance(&mut self, wallet: impl Into<String>, value: U256) {
        self.balance.insert(wallet.into(), value);
    }

    /// Adds to a wallet balance.
    pub fn credit(&mut self, wallet: &str, value: U256) {
        let current = self.balance_of(wallet);
        self.balance.insert(wallet.to_string(), current + value);
    }

    /// Remaining allowance granted by `owner` to `spender`.
    #[must_use]
    pub fn allowance_of(&self, owner: &str, spender: &str) -> U256 {
        self.allowance
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    // =========================================================================
    // SHARED OPERATIONS
    // =========================================================================

    /// Routes one of the shared LRC-20 functions; `None` when the name is not
    /// part of the shared set and the embedding contract must handle it.
    ///
    /// `mint` and `burn` run the default policies here; contracts with their
    /// own policy intercept those names before delegating.
    pub fn dispatch(
        &mut self,
        function: &str,
        ctx: &CallContext,
    ) -> Option<Result<Value, ExecutionError>> {
        match function {
            "mint" => Some(self.default_mint(ctx)),
            "burn" => Some(Self::default_burn()),
            "transfer" => Some(self.transfer(ctx)),
            "transferFrom" => Some(self.transfer_from(ctx)),
            "approve" => Some(self.approve(ctx)),
            "name" => Some(Ok(Value::Text(self.name.clone()))),
            "symbol" => Some(Ok(Value::Text(self.symbol.clone()))),
            "decimals" => Some(Ok(Value::Number(self.decimals))),
            "totalSupply" => Some(Ok(Value::BigInt(self.total_supply))),
            "owners" => Some(Ok(self.owners())),
            "balanceOf" => Some(self.balance_of_query(ctx)),
            "allowance" => Some(self.allowance_query(ctx)),
            _ => None,
        }
    }

    fn transfer(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let to: String = ctx.args.arg("transfer", 0)?;
        let value: U256 = ctx.args.arg("transfer", 1)?;
        self.transfer_logic(ctx.sender(), &to, value, ctx)?;
        Ok(Value::Null)
    }

    fn transfer_from(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let from: String = ctx.args.arg("transferFrom", 0)?;
        let to: String = ctx.args.arg("transferFrom", 1)?;
        let value: U256 = ctx.args.arg("transferFrom", 2)?;

        let allowance = self.allowance_of(&from, ctx.sender());
        if allowance < value {
            return Err(ExecutionError::contract(
                "transferFrom: allowance for spender not enough",
            ));
        }

        self.transfer_logic(&from, &to, value, ctx)?;

        // No entry to decrement when the allowance map is absent, which is
        // only reachable for zero-value transfers.
        if let Some(spenders) = self.allowance.get_mut(&from) {
            spenders.insert(ctx.sender().to_string(), allowance - value);
        }
        Ok(Value::Null)
    }

    fn approve(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let spender: String = ctx.args.arg("approve", 0)?;
        let value: U256 = ctx.args.arg("approve", 1)?;

        self.allowance
            .entry(ctx.sender().to_string())
            .or_default()
            .insert(spender.clone(), value);

        ctx.emit(
            "APPROVE",
            format!(
                "OWNER: '{}'; SPENDER: '{spender}'; VALUE: {value}",
                ctx.sender()
            ),
        );
        Ok(Value::Null)
    }

    fn balance_of_query(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let wallet: String = ctx.args.arg("balanceOf", 0)?;
        Ok(Value::BigInt(self.balance_of(&wallet)))
    }

    fn allowance_query(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let owner: String = ctx.args.arg("allowance", 0)?;
        let spender: String = ctx.args.arg("allowance", 1)?;
        Ok(Value::BigInt(self.allowance_of(&owner, &spender)))
    }

    /// The full balance map, for the `owners` query.
    #[must_use]
    pub fn owners(&self) -> Value {
        bigint_map(&self.balance)
    }

    // =========================================================================
    // POLICY HOOKS
    // =========================================================================

    /// Default mint policy: owner-only, once, the full amount to the sender.
    pub fn default_mint(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let amount: U256 = ctx.args.arg("mint", 0)?;

        if ctx.sender() != self.owner {
            return Err(ExecutionError::contract("mint: only the owner can mint"));
        }
        if self.already_minted {
            return Err(ExecutionError::contract(
                "mint: already minted; can only be done once",
            ));
        }

        self.already_minted = true;
        let to = ctx.sender().to_string();
        self.internal_mint(&to, amount, ctx);
        Ok(Value::Null)
    }

    /// Default burn policy: rejected.
    pub fn default_burn() -> Result<Value, ExecutionError> {
        Err(ExecutionError::contract("burn: not implemented"))
    }

    /// Credits `to` and grows the supply, emitting the mint TRANSFER event.
    pub fn internal_mint(&mut self, to: &str, value: U256, ctx: &CallContext) {
        self.credit(to, value);
        self.total_supply += value;
        ctx.emit("TRANSFER", format!("FROM: 0x0; TO: '{to}'; VALUE: {value}"));
    }

    /// Debits `from` and shrinks the supply, emitting the burn TRANSFER event.
    pub fn internal_burn(
        &mut self,
        from: &str,
        value: U256,
        ctx: &CallContext,
    ) -> Result<(), ExecutionError> {
        let current = self.balance_of(from);
        if value > current {
            return Err(ExecutionError::contract("burn: balance too small"));
        }
        self.balance.insert(from.to_string(), current - value);
        self.total_supply -= value;
        ctx.emit("TRANSFER", format!("FROM: {from}; TO: '0x0'; VALUE: {value}"));
        Ok(())
    }

    /// Moves `value` from one wallet to another.
    ///
    /// Shared by `transfer` and `transferFrom`; the allowance check has
    /// already passed when this runs for `transferFrom`.
    pub fn transfer_logic(
        &mut self,
        from: &str,
        to: &str,
        value: U256,
        ctx: &CallContext,
    ) -> Result<(), ExecutionError> {
        let current_from = self.balance_of(from);
        if value > current_from {
            return Err(ExecutionError::contract("transfer: balance too small"));
        }

        self.balance.insert(from.to_string(), current_from - value);
        self.credit(to, value);

        ctx.emit(
            "TRANSFER",
            format!("FROM: '{from}'; TO: '{to}'; VALUE: {value}"),
        );
        Ok(())
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Snapshots every field, including identity fields a subclass may have
    /// rewritten.
    #[must_use]
    pub fn state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("name".to_string(), Value::Text(self.name.clone()));
        state.insert("symbol".to_string(), Value::Text(self.symbol.clone()));
        state.insert("decimals".to_string(), Value::Number(self.decimals));
        state.insert("owner".to_string(), Value::Text(self.owner.clone()));
        state.insert("alreadyMinted".to_string(), Value::Bool(self.already_minted));
        state.insert("totalSupply".to_string(), Value::BigInt(self.total_supply));
        state.insert("allowance".to_string(), nested_bigint_map(&self.allowance));
        state.insert("balance".to_string(), bigint_map(&self.balance));
        state
    }

    /// Restores fields present in the snapshot; absent fields keep their
    /// constructor values.
    pub fn load_state(&mut self, state: &StateMap) -> Result<(), CodecError> {
        if let Some(name) = codec::text_field(state, "name")? {
            self.name = name;
        }
        if let Some(symbol) = codec::text_field(state, "symbol")? {
            self.symbol = symbol;
        }
        if let Some(decimals) = codec::number_field(state, "decimals")? {
            self.decimals = decimals;
        }
        if let Some(owner) = codec::text_field(state, "owner")? {
            self.owner = owner;
        }
        if let Some(minted) = codec::bool_field(state, "alreadyMinted")? {
            self.already_minted = minted;
        }
        if let Some(supply) = codec::bigint_field(state, "totalSupply")? {
            self.total_supply = supply;
        }
        if let Some(entries) = codec::map_field(state, "allowance")? {
            self.allowance = nested_bigint_entries(entries, "allowance")?;
        }
        if let Some(entries) = codec::map_field(state, "balance")? {
            self.balance = bigint_entries(entries, "balance")?;
        }
        Ok(())
    }
}

// =============================================================================
// MAP CONVERSIONS
// =============================================================================

pub(crate) fn mismatch(path: &str, expected: &'static str) -> CodecError {
    CodecError::Mismatch {
        path: path.to_string(),
        expected,
    }
}

/// Renders a wallet → amount map as a state value.
pub(crate) fn bigint_map(map: &IndexMap<String, U256>) -> Value {
    Value::map_from(map.iter().map(|(k, v)| (k.as_str(), *v)))
}

/// Parses a wallet → amount map out of a decoded state value.
pub(crate) fn bigint_entries(
    entries: &[(Value, Value)],
    path: &str,
) -> Result<IndexMap<String, U256>, CodecError> {
    let mut map = IndexMap::new();
    for (key, value) in entries {
        let key = key.as_text().ok_or_else(|| mismatch(path, "text key"))?;
        let value = value
            .coerce_bigint()
            .ok_or_else(|| mismatch(path, "bigint"))?;
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

fn nested_bigint_map(map: &IndexMap<String, IndexMap<String, U256>>) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, inner)| (Value::Text(k.clone()), bigint_map(inner)))
            .collect(),
    )
}

fn nested_bigint_entries(
    entries: &[(Value, Value)],
    path: &str,
) -> Result<IndexMap<String, IndexMap<String, U256>>, CodecError> {
    let mut map = IndexMap::new();
    for (key, value) in entries {
        let key = key.as_text().ok_or_else(|| mismatch(path, "text key"))?;
        let inner = match value {
            Value::Map(inner) => bigint_entries(inner, path)?,
            _ => return Err(mismatch(path, "map")),
        };
        map.insert(key.to_string(), inner);
    }
    Ok(map)
}

// =============================================================================
// TESTS
// =============================================================================
