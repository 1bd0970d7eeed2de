//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the execution core and its persistence. The
//! engine only ever talks to stores through these interfaces; adapters
//! provide the concrete backing.

pub mod outbound;

pub use outbound::*;
