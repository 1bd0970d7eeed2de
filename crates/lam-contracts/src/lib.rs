//! # Lambda Contracts - Standard Contract Suite
//!
//! The stock contracts executed by `lam-engine`: the LRC-20 and LRC-721
//! bases, the launch tokens, the protocol-operated bitcoin ledger, the DMT
//! mint-quota template with its deployer, and the kitchen staking farm.
//!
//! | Template | What it is |
//! |----------------|------------------------------------------------------|
//! | `bitcoin` | protocol-operated pBTC ledger with fee payouts |
//! | `LAMBCHOP` | farming reward token, minted once by the kitchen |
//! | `LMDA` | fixed-supply token with transferable ownership |
//! | `MEOW` | owner-minted community token |
//! | `dmt-token` | quota-mint template, deployed as `dmt:SYMBOL` aliases |
//! | `dmt-deployer` | deploys and initializes `dmt-token` aliases |
//! | `kitchen` | LAMBCHOP staking farm over registered LRC-20 tokens |
//!
//! [`standard_catalog`] wires all of them into a catalog ready for an
//! `EngineService`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::missing_errors_doc)]

pub mod bitcoin;
pub mod dmt_deployer;
pub mod dmt_token;
pub mod kitchen;
pub mod lrc20;
pub mod lrc721;
pub mod token_helper;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;

pub use bitcoin::Bitcoin;
pub use dmt_deployer::DmtDeployer;
pub use dmt_token::DmtToken;
pub use kitchen::Kitchen;
pub use lrc20::{Lrc20Base, LRC20_FUNCTIONS};
pub use lrc721::{Lrc721Base, LRC721_FUNCTIONS};
pub use token_helper::TokenHelper;
pub use tokens::{Lambchop, Lmda, Meow};

use lam_engine::contract::ContractCatalog;
use lam_engine::errors::EngineError;

/// Builds the catalog of stock contract templates.
///
/// Registration validates each template's identity and function list, so a
/// malformed contract fails here at startup rather than at dispatch time.
pub fn standard_catalog() -> Result<ContractCatalog, EngineError> {
    let mut catalog = ContractCatalog::new();
    catalog.register_fn(|| Box::new(Bitcoin::new()))?;
    catalog.register_fn(|| Box::new(Lambchop::new()))?;
    catalog.register_fn(|| Box::new(Lmda::new()))?;
    catalog.register_fn(|| Box::new(Meow::new()))?;
    catalog.register_fn(|| Box::new(DmtToken::new()))?;
    catalog.register_fn(|| Box::new(DmtDeployer::new()))?;
    catalog.register_fn(|| Box::new(Kitchen::new()))?;
    Ok(catalog)
}
