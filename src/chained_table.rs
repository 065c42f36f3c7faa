//! ChainedTable: separate-chaining structural layer over decoded keys.
//!
//! Records live in a `SlotMap`; each bucket is a singly linked chain of
//! slot keys threaded through the records. Every record stores the hash it
//! was inserted with, and relinking on growth only reads stored hashes, so
//! `K: Hash` runs exactly once per inserted key.

use crate::config::TableConfig;
use crate::error::SetError;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug, Clone)]
struct Node<K> {
    key: K,
    hash: u64,
    next: Option<DefaultKey>,
}

/// A live record together with the bucket that holds it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Position {
    bucket: usize,
    node: DefaultKey,
}

pub struct ChainedTable<K, S = DefaultHashBuilder> {
    hasher: S,
    heads: Vec<Option<DefaultKey>>,
    nodes: SlotMap<DefaultKey, Node<K>>,
    max_load_factor: f32,
}

impl<K> ChainedTable<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: TableConfig) -> Result<Self, SetError> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K> Default for ChainedTable<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> ChainedTable<K, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        let config = TableConfig::default();
        Self {
            hasher,
            heads: vec![None; config.initial_buckets],
            nodes: SlotMap::with_key(),
            max_load_factor: config.max_load_factor,
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, SetError> {
        config.validate()?;
        let heads = alloc_heads(config.initial_buckets)
            .ok_or(SetError::CapacityOverflow(config.initial_buckets))?;
        Ok(Self {
            hasher,
            heads,
            nodes: SlotMap::with_key(),
            max_load_factor: config.max_load_factor,
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.heads.len() as u64) as usize
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.bucket_count() as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Bucket that `q` hashes to, whether or not it is present.
    pub fn bucket_of<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.bucket_index(self.make_hash(q))
    }

    fn find<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let mut cur = self.heads[self.bucket_index(hash)];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.hash == hash && node.key.borrow() == q {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    /// Insert `key` at the head of its chain. Returns `false` and leaves the
    /// table untouched when an equal key is already present.
    ///
    /// Past `TableConfig::MAX_BUCKETS`, or when the larger bucket array
    /// cannot be allocated, the key is linked into the current buckets and
    /// the load factor exceeds its maximum.
    pub fn insert(&mut self, key: K) -> bool {
        if self.find(&key).is_some() {
            return false;
        }
        if let Err(e) = self.grow_for(self.len() + 1) {
            log::debug!("insert without growth at {} buckets: {}", self.bucket_count(), e);
        }
        let hash = self.make_hash(&key);
        let bucket = self.bucket_index(hash);
        let next = self.heads[bucket];
        let k = self.nodes.insert(Node { key, hash, next });
        self.heads[bucket] = Some(k);
        true
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let bucket = self.bucket_index(hash);
        let mut prev: Option<DefaultKey> = None;
        let mut cur = self.heads[bucket];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.hash == hash && node.key.borrow() == q {
                let next = node.next;
                match prev {
                    Some(p) => self.nodes[p].next = next,
                    None => self.heads[bucket] = next,
                }
                return self.nodes.remove(k).map(|n| n.key);
            }
            prev = cur;
            cur = node.next;
        }
        None
    }

    /// Drop every record. The bucket count is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.heads.iter_mut().for_each(|h| *h = None);
    }

    /// Grow so that `additional` more keys fit within the load factor.
    ///
    /// Fails with `CapacityOverflow`, leaving the table unchanged, when that
    /// needs more than `TableConfig::MAX_BUCKETS` buckets or the bucket
    /// array cannot be allocated.
    pub fn reserve(&mut self, additional: usize) -> Result<(), SetError> {
        let len = self
            .len()
            .checked_add(additional)
            .ok_or(SetError::CapacityOverflow(usize::MAX))?;
        if self.growth_config().buckets_for(len).is_none() {
            return Err(SetError::CapacityOverflow(len));
        }
        self.grow_for(len)
    }

    fn growth_config(&self) -> TableConfig {
        TableConfig::new().max_load_factor(self.max_load_factor)
    }

    /// Grow to at least double, capped at `MAX_BUCKETS`, once `len` keys
    /// would exceed the load factor.
    fn grow_for(&mut self, len: usize) -> Result<(), SetError> {
        let limit = self.bucket_count() as f64 * self.max_load_factor as f64;
        if (len as f64) <= limit {
            return Ok(());
        }
        let needed = self
            .growth_config()
            .buckets_for(len)
            .unwrap_or(TableConfig::MAX_BUCKETS);
        let target = self
            .bucket_count()
            .saturating_mul(2)
            .max(needed)
            .min(TableConfig::MAX_BUCKETS);
        if target <= self.bucket_count() {
            return Err(SetError::CapacityOverflow(len));
        }
        self.rehash(target).ok_or(SetError::CapacityOverflow(len))
    }

    /// Rebuild all chains for `bucket_count` buckets from stored hashes.
    /// Returns `None`, with nothing relinked, if the array cannot be allocated.
    fn rehash(&mut self, bucket_count: usize) -> Option<()> {
        log::trace!(
            "rehash: {} -> {} buckets for {} keys",
            self.heads.len(),
            bucket_count,
            self.nodes.len()
        );
        let mut heads = alloc_heads(bucket_count)?;
        for (k, node) in self.nodes.iter_mut() {
            let b = (node.hash % bucket_count as u64) as usize;
            node.next = heads[b];
            heads[b] = Some(k);
        }
        self.heads = heads;
        Some(())
    }

    pub fn iter(&self) -> Iter<'_, K, S> {
        Iter {
            table: self,
            pos: self.first_position(),
            remaining: self.len(),
        }
    }

    /// Keys of bucket `index` in chain order; empty when out of range.
    pub fn bucket(&self, index: usize) -> Bucket<'_, K> {
        Bucket {
            nodes: &self.nodes,
            next: self.heads.get(index).copied().flatten(),
        }
    }

    pub fn buckets(&self) -> impl Iterator<Item = Bucket<'_, K>> + '_ {
        (0..self.bucket_count()).map(move |i| self.bucket(i))
    }

    pub(crate) fn first_position(&self) -> Option<Position> {
        self.first_from(0)
    }

    fn first_from(&self, start: usize) -> Option<Position> {
        self.heads
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(bucket, head)| head.map(|node| Position { bucket, node }))
    }

    /// Key at `pos` and the position after it in bucket order.
    pub(crate) fn step(&self, pos: Position) -> Option<(&K, Option<Position>)> {
        let node = self.nodes.get(pos.node)?;
        let next = match node.next {
            Some(n) => Some(Position {
                bucket: pos.bucket,
                node: n,
            }),
            None => self.first_from(pos.bucket + 1),
        };
        Some((&node.key, next))
    }
}

/// An all-empty bucket array, or `None` when the allocation fails.
fn alloc_heads(bucket_count: usize) -> Option<Vec<Option<DefaultKey>>> {
    let mut heads = Vec::new();
    heads.try_reserve_exact(bucket_count).ok()?;
    heads.resize(bucket_count, None);
    Some(heads)
}

impl<K, S> fmt::Debug for ChainedTable<K, S>
where
    K: Eq + Hash + fmt::Debug,
    S: BuildHasher + Clone + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Keys of the whole table in bucket order.
pub struct Iter<'a, K, S> {
    table: &'a ChainedTable<K, S>,
    pos: Option<Position>,
    remaining: usize,
}

impl<'a, K, S> Iterator for Iter<'a, K, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (key, next) = self.table.step(self.pos?)?;
        self.pos = next;
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, S> ExactSizeIterator for Iter<'a, K, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
}

/// Keys of a single bucket in chain order.
pub struct Bucket<'a, K> {
    nodes: &'a SlotMap<DefaultKey, Node<K>>,
    next: Option<DefaultKey>,
}

impl<'a, K> Iterator for Bucket<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.next?)?;
        self.next = node.next;
        Some(&node.key)
    }
}
