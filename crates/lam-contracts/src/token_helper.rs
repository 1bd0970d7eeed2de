//! # Token Helper
//!
//! Typed convenience wrapper for LRC-20 interactions from inside another
//! contract. Every call re-resolves the token so a handle never outlives the
//! contract it points at.

use lam_engine::contract::Args;
use lam_engine::domain::value::{Value, U256};
use lam_engine::errors::ExecutionError;
use lam_engine::execution::{ContractHandle, Ecosystem};

/// LRC-20 access bound to one token name and the calling contract's identity.
pub struct TokenHelper {
    contract: String,
    ecosystem: Ecosystem,
}

impl TokenHelper {
    /// Binds a helper to a token contract name.
    #[must_use]
    pub fn new(contract: impl Into<String>, ecosystem: &Ecosystem) -> Self {
        Self {
            contract: contract.into(),
            ecosystem: ecosystem.clone(),
        }
    }

    async fn obj(&self) -> Result<ContractHandle, ExecutionError> {
        self.ecosystem
            .try_contract(&self.contract)
            .await?
            .ok_or_else(|| {
                ExecutionError::contract(format!("Contract {} not found", self.contract))
            })
    }

    /// Mints `value` to a wallet; the token must accept `mint(to, value)`.
    pub async fn mint(&self, to: &str, value: U256) -> Result<(), ExecutionError> {
        let token = self.obj().await?;
        token
            .call("mint", vec![Value::Text(to.to_string()), Value::BigInt(value)])
            .await?;
        Ok(())
    }

    /// Burns `value` from a wallet; the token must accept `burn(from, value)`.
    pub async fn burn(&self, from: &str, value: U256) -> Result<(), ExecutionError> {
        let token = self.obj().await?;
        token
            .call(
                "burn",
                vec![Value::Text(from.to_string()), Value::BigInt(value)],
            )
            .await?;
        Ok(())
    }

    /// Transfers from the calling contract to `to`.
    ///
    /// With `check` set, the receiver balance is compared before and after
    /// and a shortfall fails the call; tokens that skim on transfer cannot
    /// silently under-deliver.
    pub async fn transfer(
        &self,
        to: &str,
        value: U256,
        check: bool,
    ) -> Result<(), ExecutionError> {
        let token = self.obj().await?;
        let args = vec![Value::Text(to.to_string()), Value::BigInt(value)];
        if check {
            let before = self.balance_of(to).await?;
            token.call("transfer", args).await?;
            let after = self.balance_of(to).await?;
            if after != before + value {
                return Err(ExecutionError::contract(
                    "transfer: transfer failed; not the full amount received",
                ));
            }
        } else {
            token.call("transfer", args).await?;
        }
        Ok(())
    }

    /// Transfers between two wallets on the calling contract's allowance.
    ///
    /// `check` verifies the receiver balance delta, not the sender's.
    pub async fn transfer_from(
        &self,
        from: &str,
        to: &str,
        value: U256,
        check: bool,
    ) -> Result<(), ExecutionError> {
        let token = self.obj().await?;
        let args = vec![
            Value::Text(from.to_string()),
            Value::Text(to.to_string()),
            Value::BigInt(value),
        ];
        if check {
            let before = self.balance_of(to).await?;
            token.call("transferFrom", args).await?;
            let after = self.balance_of(to).await?;
            if after != before + value {
                return Err(ExecutionError::contract(
                    "transfer: transfer failed; not the full amount received",
                ));
            }
        } else {
            token.call("transferFrom", args).await?;
        }
        Ok(())
    }

    /// Balance of a wallet.
    pub async fn balance_of(&self, wallet: &str) -> Result<U256, ExecutionError> {
        let token = self.obj().await?;
        let value = token
            .call("balanceOf", vec![Value::Text(wallet.to_string())])
            .await?;
        value
            .coerce_bigint()
            .ok_or_else(|| ExecutionError::contract("balanceOf: expected a bigint result"))
    }

    /// Total supply of the token.
    pub async fn total_supply(&self) -> Result<U256, ExecutionError> {
        let token = self.obj().await?;
        let value = token.call("totalSupply", Args::default()).await?;
        value
            .coerce_bigint()
            .ok_or_else(|| ExecutionError::contract("totalSupply: expected a bigint result"))
    }
}
