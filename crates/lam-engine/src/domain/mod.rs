//! # Domain Layer (Inner Hexagon)
//!
//! Pure data types for contract execution: values, call metadata,
//! inscriptions, events, the transaction log, and deterministic randomness.
//! NO I/O, NO async; adapters and services depend on this layer, never the
//! other way around.

pub mod event;
pub mod inscription;
pub mod metadata;
pub mod random;
pub mod transaction_log;
pub mod value;

pub use event::*;
pub use inscription::*;
pub use metadata::*;
pub use random::*;
pub use transaction_log::*;
pub use value::*;
