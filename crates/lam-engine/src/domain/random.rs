//! # Deterministic Randomness
//!
//! A small multiply-shift PRNG seeded from the transaction hash. Every replay
//! of the same transaction observes the same sequence, so contracts may draw
//! random numbers without breaking consensus.

use primitive_types::U256;

/// Seeds reduce modulo this before truncation to 32 bits.
const SEED_MODULUS: u64 = 9_007_199_254_740_991;

// =============================================================================
// MULBERRY32
// =============================================================================

/// Mulberry32 generator state.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Creates a generator from a raw 32-bit seed.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Creates a generator seeded from a transaction hash.
    ///
    /// Hex hashes (with or without a `0x` prefix) are interpreted numerically;
    /// anything else folds its raw bytes into the seed.
    #[must_use]
    pub fn from_hash(hash: &str) -> Self {
        Self::new(seed_from_hash(hash))
    }

    /// Returns the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }

    /// Returns the next integer in `[low, high)`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn next_int(&mut self, low: u64, high: u64) -> u64 {
        let span = high.saturating_sub(low);
        (self.next_f64() * span as f64).floor() as u64 + low
    }
}

/// Derives a 32-bit seed from a transaction hash string.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn seed_from_hash(hash: &str) -> u32 {
    let hex = hash.strip_prefix("0x").unwrap_or(hash);
    match U256::from_str_radix(hex, 16) {
        Ok(n) => (n % U256::from(SEED_MODULUS)).low_u64() as u32,
        Err(_) => hex
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b))),
    }
}

// =============================================================================
// TESTS
// =============================================================================
