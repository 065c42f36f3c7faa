//! HashSet: the host-facing set container over one key codec.
//!
//! Every entry point takes an externally encoded value, validates it with
//! the codec, and only then touches the table. Storage is shared with
//! outstanding cursors through an `Rc`; a mutation only proceeds when the
//! set holds the sole reference.

use crate::chained_table::{ChainedTable, Iter};
use crate::codec::{IntegerCodec, KeyCodec, KeyKind, StringCodec};
use crate::config::TableConfig;
use crate::cursor::Cursor;
use crate::error::SetError;
use core::fmt;
use core::hash::BuildHasher;
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;
use serde_json::Value;
use std::rc::Rc;

pub struct HashSet<C: KeyCodec, S = DefaultHashBuilder> {
    table: Rc<ChainedTable<C::Key, S>>,
    _codec: PhantomData<C>,
}

/// Set of signed 64-bit integers, reported as `"Integer"`.
pub type IntegerSet = HashSet<IntegerCodec>;
/// Set of UTF-8 strings, reported as `"String"`.
pub type StringSet = HashSet<StringCodec>;

impl<C: KeyCodec> HashSet<C> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: TableConfig) -> Result<Self, SetError> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<C: KeyCodec> Default for HashSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, S> HashSet<C, S>
where
    C: KeyCodec,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: Rc::new(ChainedTable::with_hasher(hasher)),
            _codec: PhantomData,
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, SetError> {
        Ok(Self {
            table: Rc::new(ChainedTable::with_config_and_hasher(config, hasher)?),
            _codec: PhantomData,
        })
    }

    fn decode_arg(arg: Option<&Value>) -> Result<C::Key, SetError> {
        let value = arg.ok_or(SetError::MissingArgument)?;
        let invalid = SetError::InvalidKeyType { expected: C::KIND };
        if !C::validate(value) {
            return Err(invalid);
        }
        C::decode(value).ok_or(invalid)
    }

    fn table_mut(&mut self) -> Result<&mut ChainedTable<C::Key, S>, SetError> {
        let outstanding = Rc::strong_count(&self.table) - 1;
        Rc::get_mut(&mut self.table).ok_or_else(|| {
            log::debug!(
                "rejecting mutation of {} set: {} cursor(s) outstanding",
                C::kind_name(),
                outstanding
            );
            SetError::ConcurrentModification
        })
    }

    /// Make the key a member. Adding a present key is a no-op.
    pub fn add(&mut self, arg: Option<&Value>) -> Result<(), SetError> {
        let key = Self::decode_arg(arg)?;
        self.table_mut()?.insert(key);
        Ok(())
    }

    /// Drop the key from the set. Removing an absent key is a no-op.
    pub fn remove(&mut self, arg: Option<&Value>) -> Result<(), SetError> {
        let key = Self::decode_arg(arg)?;
        self.table_mut()?.remove(&key);
        Ok(())
    }

    pub fn contains(&self, arg: Option<&Value>) -> Result<bool, SetError> {
        let key = Self::decode_arg(arg)?;
        Ok(self.table.contains(&key))
    }

    /// Number of records for the key; never more than one.
    pub fn count(&self, arg: Option<&Value>) -> Result<usize, SetError> {
        self.contains(arg).map(usize::from)
    }

    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) -> Result<(), SetError> {
        self.table_mut()?.clear();
        Ok(())
    }

    /// Grow the bucket array so `additional` more keys fit within the load
    /// factor. Fails with `CapacityOverflow` when that is out of reach.
    pub fn reserve(&mut self, additional: usize) -> Result<(), SetError> {
        self.table_mut()?.reserve(additional)
    }

    /// All keys in bucket order. Two calls without a mutation in between
    /// return the same order.
    pub fn keys(&self) -> Vec<Value> {
        self.table.iter().map(C::encode).collect()
    }

    /// Keys grouped by bucket index, `0..bucket_count()`.
    pub fn buckets(&self) -> Vec<Vec<Value>> {
        self.table
            .buckets()
            .map(|bucket| bucket.map(C::encode).collect())
            .collect()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Index of the bucket the key hashes to, present or not.
    pub fn bucket_of(&self, arg: Option<&Value>) -> Result<usize, SetError> {
        let key = Self::decode_arg(arg)?;
        Ok(self.table.bucket_of(&key))
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    /// A cursor over the current keys. Mutations fail with
    /// [`SetError::ConcurrentModification`] until it is dropped or exhausted.
    pub fn iterator(&self) -> Cursor<C, S> {
        Cursor::new(Rc::clone(&self.table))
    }

    /// Number of cursors still holding the storage.
    pub fn outstanding_cursors(&self) -> usize {
        Rc::strong_count(&self.table) - 1
    }

    pub fn type_name(&self) -> &'static str {
        C::kind_name()
    }

    pub fn kind(&self) -> KeyKind {
        C::KIND
    }

    /// Borrowing iterator over decoded keys in bucket order.
    pub fn iter(&self) -> Iter<'_, C::Key, S> {
        self.table.iter()
    }
}

impl<C, S> fmt::Debug for HashSet<C, S>
where
    C: KeyCodec,
    S: BuildHasher + Clone + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashSet")
            .field("type", &C::kind_name())
            .field("keys", &*self.table)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    /// Invariant: `add` of a present key leaves `size` unchanged.
    #[test]
    fn add_is_idempotent() {
        let mut s = IntegerSet::new();
        s.add(Some(&json!(5))).unwrap();
        s.add(Some(&json!(7))).unwrap();
        s.add(Some(&json!(5))).unwrap();
        assert_eq!(s.size(), 2);
        assert!(s.contains(Some(&json!(5))).unwrap());
        assert!(!s.contains(Some(&json!(9))).unwrap());
        let keys: BTreeSet<i64> = s.keys().iter().filter_map(Value::as_i64).collect();
        assert_eq!(keys, BTreeSet::from([5, 7]));
    }

    /// Invariant: a failed call never mutates the set.
    #[test]
    fn rejected_arguments_leave_set_unchanged() {
        let mut s = IntegerSet::new();
        s.add(Some(&json!(1))).unwrap();

        assert_eq!(s.add(None), Err(SetError::MissingArgument));
        assert_eq!(
            s.add(Some(&json!("x"))),
            Err(SetError::InvalidKeyType {
                expected: KeyKind::Integer
            })
        );
        assert_eq!(
            s.remove(Some(&json!(1.25))),
            Err(SetError::InvalidKeyType {
                expected: KeyKind::Integer
            })
        );
        assert_eq!(s.contains(None), Err(SetError::MissingArgument));
        assert_eq!(s.count(Some(&Value::Null)).unwrap_err(), SetError::InvalidKeyType {
            expected: KeyKind::Integer
        });
        assert_eq!(s.size(), 1);
        assert!(s.contains(Some(&json!(1))).unwrap());
    }

    #[test]
    fn string_add_remove_count() {
        let mut s = StringSet::new();
        s.add(Some(&json!("a"))).unwrap();
        assert_eq!(s.count(Some(&json!("a"))), Ok(1));
        s.remove(Some(&json!("a"))).unwrap();
        assert!(s.empty());
        assert_eq!(s.count(Some(&json!("a"))), Ok(0));
        // Absent removal is silent.
        assert_eq!(s.remove(Some(&json!("a"))), Ok(()));
    }

    /// Invariant: flattening `buckets()` yields `keys()` and each key sits in
    /// the bucket `bucket_of` reports.
    #[test]
    fn buckets_partition_keys() {
        let mut s = StringSet::new();
        for i in 0..50 {
            s.add(Some(&json!(format!("key{i}")))).unwrap();
        }
        let buckets = s.buckets();
        assert_eq!(buckets.len(), s.bucket_count());
        let flat: Vec<Value> = buckets.iter().flatten().cloned().collect();
        assert_eq!(flat, s.keys());
        for (i, bucket) in buckets.iter().enumerate() {
            for k in bucket {
                assert_eq!(s.bucket_of(Some(k)), Ok(i));
            }
        }
    }

    /// Invariant: while a cursor is outstanding every mutation fails with
    /// `ConcurrentModification` and the set is unchanged.
    #[test]
    fn mutation_blocked_by_live_cursor() {
        let mut s = IntegerSet::new();
        s.add(Some(&json!(1))).unwrap();
        s.add(Some(&json!(2))).unwrap();

        let cursor = s.iterator();
        assert_eq!(s.outstanding_cursors(), 1);
        assert_eq!(s.add(Some(&json!(3))), Err(SetError::ConcurrentModification));
        assert_eq!(s.remove(Some(&json!(1))), Err(SetError::ConcurrentModification));
        assert_eq!(s.clear(), Err(SetError::ConcurrentModification));
        assert_eq!(s.reserve(100), Err(SetError::ConcurrentModification));
        // Reads are fine.
        assert_eq!(s.size(), 2);
        assert!(s.contains(Some(&json!(1))).unwrap());

        drop(cursor);
        assert_eq!(s.outstanding_cursors(), 0);
        s.add(Some(&json!(3))).unwrap();
        assert_eq!(s.size(), 3);
    }

    /// Invariant: argument validation is reported before the cursor check.
    #[test]
    fn validation_precedes_cursor_check() {
        let mut s = IntegerSet::new();
        let _cursor = s.iterator();
        assert_eq!(s.add(None), Err(SetError::MissingArgument));
    }

    #[test]
    fn clear_then_empty() {
        let mut s = IntegerSet::new();
        for k in [-13, 79, 42] {
            s.add(Some(&json!(k))).unwrap();
        }
        s.clear().unwrap();
        assert!(s.empty());
        assert_eq!(s.size(), 0);
        assert!(s.keys().is_empty());
    }

    #[test]
    fn type_and_kind() {
        let mut s = IntegerSet::new();
        s.add(Some(&json!(1))).unwrap();
        assert_eq!(s.type_name(), "Integer");
        assert_eq!(s.kind(), KeyKind::Integer);
        assert_eq!(StringSet::new().type_name(), "String");
    }

    #[test]
    fn config_controls_initial_buckets() {
        let s = StringSet::with_config(TableConfig::new().initial_buckets(3)).unwrap();
        assert_eq!(s.bucket_count(), 3);
        assert_eq!(s.buckets().len(), 3);
        assert!(StringSet::with_config(TableConfig::new().max_load_factor(0.0)).is_err());
    }

    #[test]
    fn iter_yields_decoded_keys() {
        let mut s = StringSet::new();
        s.add(Some(&json!("key1"))).unwrap();
        s.add(Some(&json!("key2"))).unwrap();
        let decoded: Vec<Value> = s.iter().map(|k| json!(k)).collect();
        assert_eq!(decoded, s.keys());
    }
}
