//! Cross-contract integration flows driven through the public engine API.

pub mod farming;
pub mod flows;
pub mod persistence;
pub mod support;
