//! # Domain Values
//!
//! The value model shared by contract state, invocation arguments, and query
//! results. Richer than plain JSON: big integers keep their arbitrary
//! precision, maps keep insertion order and non-string keys, and sets keep
//! their identity instead of collapsing into arrays.

use indexmap::IndexMap;
use std::fmt;

// Re-export U256 from primitive-types for big-integer arithmetic
pub use primitive_types::U256;

/// A snapshot field map: persistable field name → value.
///
/// Insertion order is preserved so snapshots are byte-stable across runs.
pub type StateMap = IndexMap<String, Value>;

// =============================================================================
// VALUE
// =============================================================================

/// A self-describing domain value.
///
/// `Map` and `Set` are entry lists rather than hashed containers: order is
/// part of the value (it mirrors insertion order in the contract state), and
/// map keys may be any value, not just strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Floating-point number (block heights, token ids, ratios).
    Number(f64),
    /// Arbitrary-precision non-negative integer (token amounts, supplies).
    BigInt(U256),
    /// UTF-8 text.
    Text(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Ordered key → value entries.
    Map(Vec<(Value, Value)>),
    /// Ordered unique elements.
    Set(Vec<Value>),
}

impl Value {
    /// Builds a map value from an entry iterator.
    pub fn map_from<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the text content, if this is a `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content, if this is a `Number`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerces this value into a big integer.
    ///
    /// Accepts `BigInt` directly, non-negative integral `Number`s within the
    /// exactly-representable double range, and decimal `Text`. Inscription
    /// arguments arrive as JSON, which has no big-integer literal, so token
    /// amounts show up as numbers or decimal strings on the wire.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn coerce_bigint(&self) -> Option<U256> {
        match self {
            Self::BigInt(v) => Some(*v),
            Self::Number(n) => {
                if n.fract() == 0.0 && *n >= 0.0 && *n <= 9_007_199_254_740_991.0 {
                    Some(U256::from(*n as u64))
                } else {
                    None
                }
            }
            Self::Text(s) => U256::from_dec_str(s).ok(),
            _ => None,
        }
    }

    /// Coerces this value into a block height / token id style integer.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn coerce_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64 => {
                Some(*n as u64)
            }
            Self::BigInt(v) if v.bits() <= 64 => Some(v.low_u64()),
            Self::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Converts a JSON value into a domain value.
    ///
    /// Objects become string-keyed maps in document order; numbers become
    /// `Number`, since JSON carries no big-integer literal (see
    /// [`Value::coerce_bigint`]).
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::MAX)),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Self::Array(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(fields) => Self::Map(
                fields
                    .iter()
                    .map(|(k, v)| (Self::Text(k.clone()), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Array(items) => write!(f, "[{} items]", items.len()),
            Self::Map(entries) => write!(f, "{{{} entries}}", entries.len()),
            Self::Set(items) => write!(f, "{{{} elements}}", items.len()),
        }
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<U256> for Value {
    fn from(v: U256) -> Self {
        Self::BigInt(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
