//! Key codecs: conversion between host values and internal keys.
//!
//! A codec owns everything that depends on the key kind. The table layer
//! only sees the decoded `Key` through `Eq + Hash`, so a new key kind is
//! added by writing a codec, not by touching the table.

use core::fmt;
use core::hash::Hash;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of key kinds a container can be built for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    Integer,
    #[serde(rename = "String")]
    Text,
}

impl KeyKind {
    pub const ALL: [KeyKind; 2] = [KeyKind::Integer, KeyKind::Text];

    /// Stable label reported by `type_name()`.
    pub fn name(self) -> &'static str {
        match self {
            KeyKind::Integer => "Integer",
            KeyKind::Text => "String",
        }
    }

    /// Inverse of [`KeyKind::name`].
    pub fn from_name(name: &str) -> Option<KeyKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kind policy for turning host values into keys and back.
pub trait KeyCodec {
    type Key: Eq + Hash + Clone + fmt::Debug;

    const KIND: KeyKind;

    /// Whether `value` converts to `Self::Key` without loss.
    fn validate(value: &Value) -> bool;

    /// Convert a value accepted by `validate`. Returns `None` for anything
    /// `validate` would reject.
    fn decode(value: &Value) -> Option<Self::Key>;

    fn encode(key: &Self::Key) -> Value;

    fn kind_name() -> &'static str {
        Self::KIND.name()
    }
}

/// Signed 64-bit integer keys.
#[derive(Copy, Clone, Debug, Default)]
pub struct IntegerCodec;

impl IntegerCodec {
    // 2^63 is exactly representable; i64::MAX as f64 rounds up to it.
    const F64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    fn from_f64(f: f64) -> Option<i64> {
        if f.is_finite() && f.fract() == 0.0 && f >= -Self::F64_BOUND && f < Self::F64_BOUND {
            Some(f as i64)
        } else {
            None
        }
    }
}

impl KeyCodec for IntegerCodec {
    type Key = i64;

    const KIND: KeyKind = KeyKind::Integer;

    fn validate(value: &Value) -> bool {
        Self::decode(value).is_some()
    }

    fn decode(value: &Value) -> Option<i64> {
        let Value::Number(n) = value else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
        if n.is_u64() {
            // Above i64::MAX.
            return None;
        }
        n.as_f64().and_then(Self::from_f64)
    }

    fn encode(key: &i64) -> Value {
        Value::from(*key)
    }
}

/// UTF-8 text keys, compared by bytes.
#[derive(Copy, Clone, Debug, Default)]
pub struct StringCodec;

impl KeyCodec for StringCodec {
    type Key = String;

    const KIND: KeyKind = KeyKind::Text;

    fn validate(value: &Value) -> bool {
        value.is_string()
    }

    fn decode(value: &Value) -> Option<String> {
        value.as_str().map(str::to_owned)
    }

    fn encode(key: &String) -> Value {
        Value::String(key.clone())
    }
}
