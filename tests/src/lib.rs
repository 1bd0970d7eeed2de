//! # Lambda Engine Test Suite
//!
//! Unified integration crate exercising the engine and the standard contract
//! suite together, end to end: wire-format inscriptions in, committed state
//! and transaction log entries out.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-contract choreography
//!     ├── flows.rs      # Wire parsing, commit/rollback, determinism
//!     ├── deployment.rs # DMT deploy lifecycle and activation gating
//!     ├── farming.rs    # Kitchen staking across three-contract chains
//!     └── persistence.rs# JSON file stores across engine restarts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p lam-tests
//!
//! # By category
//! cargo test -p lam-tests integration::flows::
//! cargo test -p lam-tests integration::deployment::
//! cargo test -p lam-tests integration::farming::
//! cargo test -p lam-tests integration::persistence::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
