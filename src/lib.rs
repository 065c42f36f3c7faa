//! chained-hashset: a single-threaded chaining hash set over a closed set
//! of key kinds, with bucket introspection and checked external cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a set whose callers speak in host values (`serde_json::Value`)
//!   while the table itself only ever sees typed keys.
//! - Layers:
//!   - KeyCodec: per-kind policy (`IntegerCodec`, `StringCodec`) that
//!     validates, decodes and encodes host values. Adding a key kind means
//!     adding a codec.
//!   - ChainedTable<K, S>: separate-chaining table over decoded keys.
//!     Records live in a `SlotMap` and are threaded into per-bucket chains;
//!     bucket placement is `hash % bucket_count` and is observable.
//!   - HashSet<C, S>: host-facing container; validates every argument
//!     before touching the table and shares storage with cursors.
//!   - Cursor<C, S>: single-pass external iterator with `has_next`/`next`.
//!   - AnySet: runtime choice between the two flavors by `KeyKind` or by
//!     label (`"Integer"`, `"String"`).
//!
//! Constraints
//! - Single-threaded: sets and cursors are `!Send`/`!Sync` (storage is
//!   shared through `Rc`).
//! - Set semantics: adding a present key and removing an absent key are
//!   silent no-ops.
//! - Failed calls never mutate: argument validation and the cursor check
//!   both happen before the table is touched.
//!
//! Cursor discipline
//! - A cursor holds a strong reference to the table until it is dropped or
//!   exhausted. Mutations go through `Rc::get_mut`, so while any cursor is
//!   outstanding `add`/`remove`/`clear`/`reserve` fail with
//!   `SetError::ConcurrentModification` and the table is never changed under
//!   a live position.
//! - Reads stay available while cursors are outstanding.
//!
//! Hashing and growth
//! - Each record stores its `u64` hash; relinking after growth reads the
//!   stored hash and never calls `K: Hash` again.
//! - Before a new key is linked, the bucket array at least doubles if the
//!   load factor would exceed `TableConfig::max_load_factor`. New records
//!   go to the head of their chain.
//! - The bucket array never grows past `TableConfig::MAX_BUCKETS`, and is
//!   allocated with `try_reserve_exact`; a `reserve` beyond reach returns
//!   `CapacityOverflow` instead of aborting.
//! - `keys()`, `buckets()`, `iter()` and cursors all walk buckets in index
//!   order and each chain head to tail, so they agree with each other and
//!   are stable between mutations.
//!
//! Notes and non-goals
//! - No persistence, no concurrent mutation, no ordering beyond bucket
//!   order.
//! - Host bindings (argument marshaling, named constructors) live outside
//!   this crate; `AnySet` is the seam they build on.

mod any_set;
pub mod chained_table;
mod chained_table_proptest;
mod codec;
mod config;
mod cursor;
mod error;
mod hash_set;

// Public surface
pub use any_set::{AnyCursor, AnySet};
pub use codec::{IntegerCodec, KeyCodec, KeyKind, StringCodec};
pub use config::TableConfig;
pub use cursor::Cursor;
pub use error::SetError;
pub use hash_set::{HashSet, IntegerSet, StringSet};
pub use serde_json::Value;
