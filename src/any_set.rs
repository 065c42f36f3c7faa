//! Runtime selection between the two supported set flavors.
//!
//! A host binding exposes one constructor per key kind under the kind's
//! label. `AnySet` is that registry: it is built from a `KeyKind` or a label
//! and forwards every operation to the concrete set.

use crate::codec::{IntegerCodec, KeyKind, StringCodec};
use crate::config::TableConfig;
use crate::cursor::Cursor;
use crate::error::SetError;
use crate::hash_set::{IntegerSet, StringSet};
use serde_json::Value;

#[derive(Debug)]
pub enum AnySet {
    Integer(IntegerSet),
    String(StringSet),
}

#[derive(Debug)]
pub enum AnyCursor {
    Integer(Cursor<IntegerCodec>),
    String(Cursor<StringCodec>),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            AnySet::Integer($s) => $body,
            AnySet::String($s) => $body,
        }
    };
}

impl AnySet {
    pub fn new(kind: KeyKind) -> Self {
        match kind {
            KeyKind::Integer => AnySet::Integer(IntegerSet::new()),
            KeyKind::Text => AnySet::String(StringSet::new()),
        }
    }

    pub fn with_config(kind: KeyKind, config: TableConfig) -> Result<Self, SetError> {
        Ok(match kind {
            KeyKind::Integer => AnySet::Integer(IntegerSet::with_config(config)?),
            KeyKind::Text => AnySet::String(StringSet::with_config(config)?),
        })
    }

    /// Build from a constructor label, `"Integer"` or `"String"`.
    pub fn from_type_name(name: &str) -> Result<Self, SetError> {
        KeyKind::from_name(name)
            .map(Self::new)
            .ok_or_else(|| SetError::UnknownKeyKind(name.to_owned()))
    }

    pub fn kind(&self) -> KeyKind {
        dispatch!(self, s => s.kind())
    }

    pub fn type_name(&self) -> &'static str {
        dispatch!(self, s => s.type_name())
    }

    pub fn add(&mut self, arg: Option<&Value>) -> Result<(), SetError> {
        dispatch!(self, s => s.add(arg))
    }

    pub fn remove(&mut self, arg: Option<&Value>) -> Result<(), SetError> {
        dispatch!(self, s => s.remove(arg))
    }

    pub fn contains(&self, arg: Option<&Value>) -> Result<bool, SetError> {
        dispatch!(self, s => s.contains(arg))
    }

    pub fn count(&self, arg: Option<&Value>) -> Result<usize, SetError> {
        dispatch!(self, s => s.count(arg))
    }

    pub fn size(&self) -> usize {
        dispatch!(self, s => s.size())
    }

    pub fn empty(&self) -> bool {
        dispatch!(self, s => s.empty())
    }

    pub fn clear(&mut self) -> Result<(), SetError> {
        dispatch!(self, s => s.clear())
    }

    pub fn reserve(&mut self, additional: usize) -> Result<(), SetError> {
        dispatch!(self, s => s.reserve(additional))
    }

    pub fn keys(&self) -> Vec<Value> {
        dispatch!(self, s => s.keys())
    }

    pub fn buckets(&self) -> Vec<Vec<Value>> {
        dispatch!(self, s => s.buckets())
    }

    pub fn bucket_count(&self) -> usize {
        dispatch!(self, s => s.bucket_count())
    }

    pub fn bucket_of(&self, arg: Option<&Value>) -> Result<usize, SetError> {
        dispatch!(self, s => s.bucket_of(arg))
    }

    pub fn load_factor(&self) -> f32 {
        dispatch!(self, s => s.load_factor())
    }

    pub fn max_load_factor(&self) -> f32 {
        dispatch!(self, s => s.max_load_factor())
    }

    pub fn iterator(&self) -> AnyCursor {
        match self {
            AnySet::Integer(s) => AnyCursor::Integer(s.iterator()),
            AnySet::String(s) => AnyCursor::String(s.iterator()),
        }
    }
}

impl AnyCursor {
    pub fn has_next(&self) -> bool {
        match self {
            AnyCursor::Integer(c) => c.has_next(),
            AnyCursor::String(c) => c.has_next(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Value, SetError> {
        match self {
            AnyCursor::Integer(c) => c.next(),
            AnyCursor::String(c) => c.next(),
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            AnyCursor::Integer(c) => c.kind(),
            AnyCursor::String(c) => c.kind(),
        }
    }
}
