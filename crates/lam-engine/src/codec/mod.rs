//! # State Snapshot Codec
//!
//! Contract state persists as plain JSON plus a type side channel. The
//! payload stays readable (big integers as decimal strings, maps as entry
//! arrays), and `typeMeta` records which payload paths must be restored to
//! richer domain types on load.
//!
//! Decoding is strict: a note whose path does not resolve, or whose node has
//! the wrong shape, fails the whole snapshot instead of silently dropping
//! state.

use crate::domain::value::{StateMap, Value, U256};
use crate::errors::CodecError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// One path step into the payload tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSeg {
    /// Object field name.
    Key(String),
    /// Array element position.
    Index(usize),
}

/// Domain type a payload node must be restored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// Decimal string holding an unsigned 256-bit integer.
    BigInt,
    /// Array of `[key, value]` entry pairs.
    Map,
    /// Array holding set members.
    Set,
}

/// A single restore instruction: the node at `path` carries type `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNote {
    /// Path from the payload root to the tagged node.
    pub path: Vec<PathSeg>,
    /// Type to restore at that node.
    pub tag: TypeTag,
}

/// A stored contract state: JSON payload plus its type side channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Plain-JSON rendering of the contract fields.
    pub payload: Json,
    /// Restore instructions, applied deepest path first.
    pub type_meta: Vec<TypeNote>,
}

impl StateSnapshot {
    /// An empty snapshot, decoding to an empty state map.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            payload: Json::Object(serde_json::Map::new()),
            type_meta: Vec::new(),
        }
    }
}

// =============================================================================
// ENCODE
// =============================================================================

/// Encodes a contract state map into a snapshot.
///
/// Fields holding an empty array are dropped; arrays regain members only
/// through execution, so persisting the empty shell adds nothing.
#[must_use]
pub fn encode(state: &StateMap) -> StateSnapshot {
    let mut meta = Vec::new();
    let mut payload = serde_json::Map::new();
    for (field, value) in state {
        if matches!(value, Value::Array(items) if items.is_empty()) {
            continue;
        }
        let mut path = vec![PathSeg::Key(field.clone())];
        payload.insert(field.clone(), encode_value(value, &mut path, &mut meta));
    }
    StateSnapshot {
        payload: Json::Object(payload),
        type_meta: meta,
    }
}

fn encode_value(value: &Value, path: &mut Vec<PathSeg>, meta: &mut Vec<TypeNote>) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Text(s) => Json::String(s.clone()),
        Value::BigInt(n) => {
            meta.push(TypeNote {
                path: path.clone(),
                tag: TypeTag::BigInt,
            });
            Json::String(n.to_string())
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(PathSeg::Index(i));
                out.push(encode_value(item, path, meta));
                path.pop();
            }
            Json::Array(out)
        }
        Value::Set(members) => {
            meta.push(TypeNote {
                path: path.clone(),
                tag: TypeTag::Set,
            });
            let mut out = Vec::with_capacity(members.len());
            for (i, member) in members.iter().enumerate() {
                path.push(PathSeg::Index(i));
                out.push(encode_value(member, path, meta));
                path.pop();
            }
            Json::Array(out)
        }
        Value::Map(entries) => {
            meta.push(TypeNote {
                path: path.clone(),
                tag: TypeTag::Map,
            });
            let mut out = Vec::with_capacity(entries.len());
            for (i, (key, val)) in entries.iter().enumerate() {
                path.push(PathSeg::Index(i));
                path.push(PathSeg::Index(0));
                let jk = encode_value(key, path, meta);
                path.pop();
                path.push(PathSeg::Index(1));
                let jv = encode_value(val, path, meta);
                path.pop();
                path.pop();
                out.push(Json::Array(vec![jk, jv]));
            }
            Json::Array(out)
        }
    }
}

// =============================================================================
// DECODE
// =============================================================================

/// Decodes a snapshot back into a contract state map.
pub fn decode(snapshot: &StateSnapshot) -> Result<StateMap, CodecError> {
    let Json::Object(_) = &snapshot.payload else {
        return Err(CodecError::Malformed(
            "state payload is not an object".to_string(),
        ));
    };
    let mut root = Value::from_json(&snapshot.payload);

    // Deepest paths first, so parents are still plain JSON shapes while
    // their children are being restored.
    let mut notes: Vec<&TypeNote> = snapshot.type_meta.iter().collect();
    notes.sort_by_key(|note| std::cmp::Reverse(note.path.len()));
    for note in notes {
        let node = locate(&mut root, &note.path)?;
        apply_tag(node, note.tag, &note.path)?;
    }

    let Value::Map(entries) = root else {
        return Err(CodecError::Malformed(
            "state payload did not decode to a field map".to_string(),
        ));
    };
    let mut state = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let Value::Text(field) = key else {
            return Err(CodecError::Malformed(
                "state payload has a non-string field name".to_string(),
            ));
        };
        state.insert(field, value);
    }
    Ok(state)
}

fn locate<'a>(root: &'a mut Value, path: &[PathSeg]) -> Result<&'a mut Value, CodecError> {
    let mut current = root;
    for seg in path {
        current = match seg {
            PathSeg::Key(key) => match current {
                Value::Map(entries) => {
                    let found = entries
                        .iter()
                        .position(|(k, _)| matches!(k, Value::Text(t) if t == key));
                    match found {
                        Some(i) => &mut entries[i].1,
                        None => return Err(dangling(path)),
                    }
                }
                _ => return Err(dangling(path)),
            },
            PathSeg::Index(i) => match current {
                Value::Array(items) => match items.get_mut(*i) {
                    Some(item) => item,
                    None => return Err(dangling(path)),
                },
                _ => return Err(dangling(path)),
            },
        };
    }
    Ok(current)
}

fn dangling(path: &[PathSeg]) -> CodecError {
    CodecError::DanglingPath {
        path: render_path(path),
    }
}

fn apply_tag(node: &mut Value, tag: TypeTag, path: &[PathSeg]) -> Result<(), CodecError> {
    match tag {
        TypeTag::BigInt => {
            let Value::Text(text) = &*node else {
                return Err(mismatch(path, "bigint"));
            };
            let n = U256::from_dec_str(text).map_err(|_| mismatch(path, "bigint"))?;
            *node = Value::BigInt(n);
        }
        TypeTag::Set => {
            let Value::Array(items) = std::mem::replace(node, Value::Null) else {
                return Err(mismatch(path, "set"));
            };
            *node = Value::Set(items);
        }
        TypeTag::Map => {
            let Value::Array(items) = std::mem::replace(node, Value::Null) else {
                return Err(mismatch(path, "map"));
            };
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                let Value::Array(mut pair) = item else {
                    return Err(mismatch(path, "map"));
                };
                if pair.len() != 2 {
                    return Err(mismatch(path, "map"));
                }
                let val = pair.pop().unwrap_or(Value::Null);
                let key = pair.pop().unwrap_or(Value::Null);
                entries.push((key, val));
            }
            *node = Value::Map(entries);
        }
    }
    Ok(())
}

fn mismatch(path: &[PathSeg], expected: &'static str) -> CodecError {
    CodecError::Mismatch {
        path: render_path(path),
        expected,
    }
}

fn render_path(path: &[PathSeg]) -> String {
    let mut out = String::new();
    for (i, seg) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        match seg {
            PathSeg::Key(k) => out.push_str(k),
            PathSeg::Index(n) => out.push_str(&n.to_string()),
        }
    }
    out
}

// =============================================================================
// FIELD EXTRACTION
// =============================================================================

/// Reads an optional big-integer field from a decoded state map.
///
/// Absent fields yield `Ok(None)` so contracts keep their defaults; a present
/// field of the wrong type is a corruption, not a default.
pub fn bigint_field(state: &StateMap, field: &str) -> Result<Option<U256>, CodecError> {
    match state.get(field) {
        None => Ok(None),
        Some(value) => value
            .coerce_bigint()
            .map(Some)
            .ok_or_else(|| field_type(field, "bigint")),
    }
}

/// Reads an optional numeric field.
pub fn number_field(state: &StateMap, field: &str) -> Result<Option<f64>, CodecError> {
    match state.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_number()
            .map(Some)
            .ok_or_else(|| field_type(field, "number")),
    }
}

/// Reads an optional unsigned integer field.
pub fn u64_field(state: &StateMap, field: &str) -> Result<Option<u64>, CodecError> {
    match state.get(field) {
        None => Ok(None),
        Some(value) => value
            .coerce_u64()
            .map(Some)
            .ok_or_else(|| field_type(field, "u64")),
    }
}

/// Reads an optional boolean field.
pub fn bool_field(state: &StateMap, field: &str) -> Result<Option<bool>, CodecError> {
    match state.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| field_type(field, "bool")),
    }
}

/// Reads an optional text field.
pub fn text_field(state: &StateMap, field: &str) -> Result<Option<String>, CodecError> {
    match state.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_text()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| field_type(field, "text")),
    }
}

/// Reads an optional map field as its entry list.
pub fn map_field<'a>(
    state: &'a StateMap,
    field: &str,
) -> Result<Option<&'a [(Value, Value)]>, CodecError> {
    match state.get(field) {
        None => Ok(None),
        Some(Value::Map(entries)) => Ok(Some(entries)),
        Some(_) => Err(field_type(field, "map")),
    }
}

fn field_type(field: &str, expected: &'static str) -> CodecError {
    CodecError::FieldType {
        field: field.to_string(),
        expected,
    }
}

// =============================================================================
// TESTS
// =============================================================================
