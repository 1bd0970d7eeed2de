//! # LRC-721 Metadata Base
//!
//! Embeddable non-fungible-token core with sequential numeric ids, per-token
//! approvals, and operator approvals. Concrete collections embed
//! [`Lrc721Base`], route the shared set through [`Lrc721Base::dispatch`], and
//! typically override `mint` and `tokenURI` with their own metadata scheme.

use crate::lrc20::mismatch;
use indexmap::IndexMap;
use lam_engine::codec;
use lam_engine::contract::CallContext;
use lam_engine::domain::value::{StateMap, Value};
use lam_engine::errors::{CodecError, ExecutionError};

/// Functions every LRC-721 collection answers.
pub const LRC721_FUNCTIONS: &[&str] = &[
    "mint",
    "transfer",
    "transferFrom",
    "approve",
    "setApprovalForAll",
    "name",
    "symbol",
    "tokenURI",
    "balanceOf",
    "ownerOf",
    "getApproved",
    "owners",
    "isApprovedForAll",
];

// =============================================================================
// BASE COLLECTION
// =============================================================================

/// Embeddable LRC-721 core: identity, holders, and both approval layers.
#[derive(Debug, Clone)]
pub struct Lrc721Base {
    name: String,
    symbol: String,
    base_url: String,
    current_token_id: u64,
    token_holder: IndexMap<u64, String>,
    approved_for: IndexMap<u64, String>,
    // owner -> operator -> approved
    wallet_approved_all: IndexMap<String, IndexMap<String, bool>>,
}

impl Lrc721Base {
    /// Creates a collection core with no minted tokens.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            base_url: base_url.into(),
            current_token_id: 0,
            token_holder: IndexMap::new(),
            approved_for: IndexMap::new(),
            wallet_approved_all: IndexMap::new(),
        }
    }

    /// Collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Metadata URL prefix used by the stock `tokenURI`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Next id a mint will assign.
    #[must_use]
    pub fn current_token_id(&self) -> u64 {
        self.current_token_id
    }

    /// Current holder of a token id.
    #[must_use]
    pub fn holder_of(&self, token_id: u64) -> Option<&str> {
        self.token_holder.get(&token_id).map(String::as_str)
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Routes one of the shared LRC-721 functions, or `None` for a name
    /// outside the set so the embedding contract can extend it.
    pub fn dispatch(
        &mut self,
        function: &str,
        ctx: &CallContext,
    ) -> Option<Result<Value, ExecutionError>> {
        let result = match function {
            "mint" => Ok(Value::from(self.mint_logic(ctx))),
            "transfer" => self.transfer(ctx),
            "transferFrom" => self.transfer_from(ctx),
            "approve" => self.approve(ctx),
            "setApprovalForAll" => self.set_approval_for_all(ctx),
            "name" => Ok(Value::Text(self.name.clone())),
            "symbol" => Ok(Value::Text(self.symbol.clone())),
            "tokenURI" => self.token_uri(ctx),
            "balanceOf" => self.balance_of(ctx),
            "ownerOf" => self.owner_of(ctx),
            "getApproved" => self.get_approved(ctx),
            "owners" => Ok(self.owners()),
            "isApprovedForAll" => self.is_approved_for_all(ctx),
            _ => return None,
        };
        Some(result)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Assigns the next id to the sender and returns it. Collections that
    /// attach metadata call this from their own `mint`.
    pub fn mint_logic(&mut self, ctx: &CallContext) -> u64 {
        let token_id = self.current_token_id;
        self.token_holder.insert(token_id, ctx.sender().to_string());
        ctx.emit(
            "TRANSFER",
            format!("FROM: '0x0'; TO: '{}'; TOKENID: {token_id}", ctx.sender()),
        );
        self.current_token_id += 1;
        token_id
    }

    fn transfer(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let to: String = ctx.args.arg("transfer", 0)?;
        let token_id: u64 = ctx.args.arg("transfer", 1)?;
        let holder = self
            .token_holder
            .get(&token_id)
            .cloned()
            .ok_or_else(|| {
                ExecutionError::contract("transfer: tokenId does not have a holder")
            })?;
        if holder != ctx.sender() {
            return Err(ExecutionError::contract(
                "transfer: token is not owned by sender",
            ));
        }
        self.transfer_logic(&holder, &to, token_id, ctx);
        Ok(Value::Null)
    }

    fn transfer_from(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let from: String = ctx.args.arg("transferFrom", 0)?;
        let to: String = ctx.args.arg("transferFrom", 1)?;
        let token_id: u64 = ctx.args.arg("transferFrom", 2)?;

        let approved = self.approved_for.get(&token_id).map(String::as_str);
        let operator = self
            .wallet_approved_all
            .get(&from)
            .and_then(|operators| operators.get(ctx.sender()))
            .copied()
            .unwrap_or(false);
        if approved != Some(ctx.sender()) && !operator {
            return Err(ExecutionError::contract(
                "transferFrom: sender is not approved address",
            ));
        }

        self.transfer_logic(&from, &to, token_id, ctx);
        Ok(Value::Null)
    }

    fn approve(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let approved: String = ctx.args.arg("approve", 0)?;
        let token_id: u64 = ctx.args.arg("approve", 1)?;
        if self.token_holder.get(&token_id).map(String::as_str) != Some(ctx.sender()) {
            return Err(ExecutionError::contract(
                "approve: sender is not the holder of the token. Must not approve NFTs of other people",
            ));
        }
        let message = format!(
            "OWNER: '{}'; TOKENID: '{token_id}'; APPROVED: {approved}",
            ctx.sender()
        );
        self.approved_for.insert(token_id, approved);
        ctx.emit("APPROVE", message);
        Ok(Value::Null)
    }

    fn set_approval_for_all(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let operator: String = ctx.args.arg("setApprovalForAll", 0)?;
        let approved: bool = ctx.args.arg("setApprovalForAll", 1)?;
        self.wallet_approved_all
            .entry(ctx.sender().to_string())
            .or_default()
            .insert(operator.clone(), approved);
        ctx.emit(
            "APPROVALFORALL",
            format!(
                "OWNER: '{}'; OPERATOR: '{operator}'; APPROVED: {approved}",
                ctx.sender()
            ),
        );
        Ok(Value::Null)
    }

    // Moving a token always voids its per-token approval.
    fn transfer_logic(&mut self, from: &str, to: &str, token_id: u64, ctx: &CallContext) {
        self.token_holder.insert(token_id, to.to_string());
        self.approved_for.shift_remove(&token_id);
        ctx.emit(
            "TRANSFER",
            format!("FROM: '{from}'; TO: '{to}'; TOKENID: {token_id}"),
        );
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    fn token_uri(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        // The argument error label for this query is tokenUri, matching the
        // deployed behavior.
        let token_id: u64 = ctx.args.arg("tokenUri", 0)?;
        Ok(Value::Text(format!("{}{token_id}", self.base_url)))
    }

    fn balance_of(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let wallet: String = ctx.args.arg("balanceOf", 0)?;
        let count = self
            .token_holder
            .values()
            .filter(|holder| **holder == wallet)
            .count();
        Ok(Value::from(count as u64))
    }

    fn owner_of(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let token_id: u64 = ctx.args.arg("ownerOf", 0)?;
        Ok(self
            .token_holder
            .get(&token_id)
            .map_or(Value::Null, |holder| Value::Text(holder.clone())))
    }

    fn get_approved(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let token_id: u64 = ctx.args.arg("getApproved", 0)?;
        Ok(self
            .approved_for
            .get(&token_id)
            .map_or(Value::Null, |approved| Value::Text(approved.clone())))
    }

    fn owners(&self) -> Value {
        let mut owners: IndexMap<String, Vec<u64>> = IndexMap::new();
        for (token_id, holder) in &self.token_holder {
            owners.entry(holder.clone()).or_default().push(*token_id);
        }
        Value::Map(
            owners
                .into_iter()
                .map(|(holder, ids)| {
                    (
                        Value::Text(holder),
                        Value::Array(ids.into_iter().map(Value::from).collect()),
                    )
                })
                .collect(),
        )
    }

    fn is_approved_for_all(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let owner: String = ctx.args.arg("isApprovedForAll", 0)?;
        let operator: String = ctx.args.arg("isApprovedForAll", 1)?;
        let approved = self
            .wallet_approved_all
            .get(&owner)
            .and_then(|operators| operators.get(&operator))
            .copied()
            .unwrap_or(false);
        Ok(Value::Bool(approved))
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Snapshots every field.
    #[must_use]
    pub fn state(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert("name".to_string(), Value::Text(self.name.clone()));
        state.insert("symbol".to_string(), Value::Text(self.symbol.clone()));
        state.insert("baseUrl".to_string(), Value::Text(self.base_url.clone()));
        state.insert(
            "currentTokenId".to_string(),
            Value::from(self.current_token_id),
        );
        state.insert(
            "tokenHolder".to_string(),
            Value::map_from(self.token_holder.iter().map(|(id, h)| (*id, h.as_str()))),
        );
        state.insert(
            "approvedFor".to_string(),
            Value::map_from(self.approved_for.iter().map(|(id, a)| (*id, a.as_str()))),
        );
        state.insert(
            "walletApprovedAll".to_string(),
            Value::Map(
                self.wallet_approved_all
                    .iter()
                    .map(|(owner, operators)| {
                        (
                            Value::Text(owner.clone()),
                            Value::map_from(
                                operators.iter().map(|(op, flag)| (op.as_str(), *flag)),
                            ),
                        )
                    })
                    .collect(),
            ),
        );
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
        if let Some(base_url) = codec::text_field(state, "baseUrl")? {
            self.base_url = base_url;
        }
        if let Some(next) = codec::u64_field(state, "currentTokenId")? {
            self.current_token_id = next;
        }
        if let Some(entries) = codec::map_field(state, "tokenHolder")? {
            self.token_holder = id_text_entries(entries, "tokenHolder")?;
        }
        if let Some(entries) = codec::map_field(state, "approvedFor")? {
            self.approved_for = id_text_entries(entries, "approvedFor")?;
        }
        if let Some(entries) = codec::map_field(state, "walletApprovedAll")? {
            self.wallet_approved_all = operator_entries(entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// MAP CONVERSIONS
// =============================================================================

/// Parses a token-id → text map out of a decoded state value.
pub(crate) fn id_text_entries(
    entries: &[(Value, Value)],
    path: &str,
) -> Result<IndexMap<u64, String>, CodecError> {
    let mut map = IndexMap::new();
    for (key, value) in entries {
        let id = key.coerce_u64().ok_or_else(|| mismatch(path, "u64 key"))?;
        let text = value.as_text().ok_or_else(|| mismatch(path, "text"))?;
        map.insert(id, text.to_string());
    }
    Ok(map)
}

fn operator_entries(
    entries: &[(Value, Value)],
) -> Result<IndexMap<String, IndexMap<String, bool>>, CodecError> {
    let mut map = IndexMap::new();
    for (key, value) in entries {
        let owner = key
            .as_text()
            .ok_or_else(|| mismatch("walletApprovedAll", "text key"))?;
        let Value::Map(inner) = value else {
            return Err(mismatch("walletApprovedAll", "map"));
        };
        let mut operators = IndexMap::new();
        for (operator_key, flag) in inner {
            let operator = operator_key
                .as_text()
                .ok_or_else(|| mismatch("walletApprovedAll", "text key"))?;
            let approved = flag
                .as_bool()
                .ok_or_else(|| mismatch("walletApprovedAll", "bool"))?;
            operators.insert(operator.to_string(), approved);
        }
        map.insert(owner.to_string(), operators);
    }
    Ok(map)
}

// =============================================================================
// TESTS
// =============================================================================
