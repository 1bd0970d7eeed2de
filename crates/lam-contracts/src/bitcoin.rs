//! # Protocol Bitcoin (pBTC)
//!
//! Ledger-side representation of bridged bitcoin. Mint, burn, and fee
//! collection are reserved to the protocol wallet; the receiving wallet for
//! fees can rotate itself.

use crate::lrc20::{unknown_function, Lrc20Base};
use async_trait::async_trait;
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
    "payProtocolFees",
    "updateReceivingWallet",
];

/// Bridged bitcoin under protocol custody.
pub struct Bitcoin {
    base: Lrc20Base,
    protocol_wallet: String,
    receiving_wallet: String,
}

impl Bitcoin {
    /// Creates the template instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Lrc20Base::new("Protocol Bitcoin", "pBTC", 8.0, "protocol"),
            protocol_wallet: "protocol".to_string(),
            receiving_wallet:
                "bc1p4utk7w9mnr0tvuyne5fgts7cu6z6t85umwvss0wnwxuu6fpg5r3qn4lre4".to_string(),
        }
    }

    fn mint_logic(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let to: String = ctx.args.arg("mint", 0)?;
        let amount: U256 = ctx.args.arg("mint", 1)?;

        if ctx.sender() != self.protocol_wallet {
            return Err(ExecutionError::contract(
                "mint: only the protocol wallet can mint bitcoin",
            ));
        }

        self.base.credit(&to, amount);
        let supply = self.base.total_supply();
        self.base.set_total_supply(supply + amount);

        ctx.emit(
            "TRANSFER",
            format!("FROM: '0x0'; TO: '{to}'; VALUE: {amount}"),
        );
        Ok(Value::Null)
    }

    // The burn arguments parse under the payProtocolFees label, matching the
    // deployed behavior.
    fn burn(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let from: String = ctx.args.arg("payProtocolFees", 0)?;
        let amount: U256 = ctx.args.arg("payProtocolFees", 1)?;

        if ctx.sender() != self.protocol_wallet {
            return Err(ExecutionError::contract(
                "burn: only protocol wallet can do this",
            ));
        }
        let from_before = self.base.balance_of(&from);
        if from_before < amount {
            return Err(ExecutionError::contract("burn: not enough balance"));
        }

        self.base.set_balance(from.clone(), from_before - amount);
        let supply = self.base.total_supply();
        self.base.set_total_supply(supply - amount);

        ctx.emit("BURN", format!("{from} burned {amount}"));
        Ok(Value::Null)
    }

    fn pay_protocol_fees(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let from: String = ctx.args.arg("payProtocolFees", 0)?;
        let fees: U256 = ctx.args.arg("payProtocolFees", 1)?;

        if ctx.sender() != self.protocol_wallet {
            return Err(ExecutionError::contract(
                "payProtocolFees: only protocol wallet can do this",
            ));
        }
        let from_before = self.base.balance_of(&from);
        if from_before < fees {
            return Err(ExecutionError::contract("payProtocolFees: not enough balance"));
        }

        self.base.set_balance(from.clone(), from_before - fees);
        let receiver = self.receiving_wallet.clone();
        self.base.credit(&receiver, fees);

        ctx.emit("PROTOCOL FEES", format!("{from} paid {fees}"));
        Ok(Value::Null)
    }

    fn update_receiving_wallet(&mut self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        let new_receiver: String = ctx.args.arg("updateReceivingWallet", 0)?;

        if ctx.sender() != self.receiving_wallet {
            return Err(ExecutionError::contract(
                "updateReceivingWallet: only the receiving wallet can change it",
            ));
        }

        self.receiving_wallet = new_receiver.clone();

        ctx.emit(
            "UPDATE",
            format!("receiving wallet updated to '{new_receiver}'"),
        );
        Ok(Value::Null)
    }
}

impl Default for Bitcoin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Contract for Bitcoin {
    fn template_name(&self) -> &str {
        "bitcoin"
    }

    fn active_on(&self) -> u64 {
        828_000
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
            "mint" => self.mint_logic(ctx),
            "burn" => self.burn(ctx),
            "payProtocolFees" => self.pay_protocol_fees(ctx),
            "updateReceivingWallet" => self.update_receiving_wallet(ctx),
            _ => self
                .base
                .dispatch(function, ctx)
                .unwrap_or_else(|| Err(unknown_function("bitcoin", function))),
        }
    }

    fn state(&self) -> StateMap {
        let mut state = self.base.state();
        state.insert(
            "protocolWallet".to_string(),
            Value::Text(self.protocol_wallet.clone()),
        );
        state.insert(
            "receivingWallet".to_string(),
            Value::Text(self.receiving_wallet.clone()),
        );
        state
    }

    fn load_state(&mut self, state: StateMap) -> Result<(), CodecError> {
        self.base.load_state(&state)?;
        if let Some(wallet) = codec::text_field(&state, "protocolWallet")? {
            self.protocol_wallet = wallet;
        }
        if let Some(wallet) = codec::text_field(&state, "receivingWallet")? {
            self.receiving_wallet = wallet;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
