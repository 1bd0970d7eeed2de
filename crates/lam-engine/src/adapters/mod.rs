//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete store implementations behind the outbound ports: in-memory for
//! tests and ephemeral runs, JSON files on disk for durable single-process
//! deployments.

pub mod memory;

#[cfg(feature = "json-store")]
pub mod json_file;

pub use memory::*;

#[cfg(feature = "json-store")]
pub use json_file::*;
