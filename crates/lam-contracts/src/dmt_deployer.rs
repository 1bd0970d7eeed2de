//! # DMT Deployer
//!
//! Stamps out `dmt-token` aliases named `dmt:SYMBOL` and forwards its own
//! arguments to the fresh alias's `init`.

use crate::lrc20::unknown_function;
use async_trait::async_trait;
use lam_engine::contract::{CallContext, Contract};
use lam_engine::domain::value::{StateMap, Value, U256};
use lam_engine::errors::{CodecError, ExecutionError};

const FUNCTIONS: &[&str] = &["deploy"];

/// Deploys DMT-style tokens; stateless.
pub struct DmtDeployer;

impl DmtDeployer {
    /// Creates the template instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn deploy(&self, ctx: &CallContext) -> Result<Value, ExecutionError> {
        // Validate the full init tuple before deploying anything.
        let _name: String = ctx.args.arg("deploy", 0)?;
        let symbol: String = ctx.args.arg("deploy", 1)?;
        let _max_supply: U256 = ctx.args.arg("deploy", 2)?;
        let _per_mint: U256 = ctx.args.arg("deploy", 3)?;

        let handle = ctx
            .ecosystem
            .deploy("dmt-token", &format!("dmt:{symbol}"))
            .await?;
        handle.call("init", ctx.args.clone()).await?;
        Ok(Value::Null)
    }
}

impl Default for DmtDeployer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Contract for DmtDeployer {
    fn template_name(&self) -> &str {
        "dmt-deployer"
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
            "deploy" => self.deploy(ctx).await,
            _ => Err(unknown_function("dmt-deployer", function)),
        }
    }

    fn state(&self) -> StateMap {
        StateMap::new()
    }

    fn load_state(&mut self, _state: StateMap) -> Result<(), CodecError> {
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
