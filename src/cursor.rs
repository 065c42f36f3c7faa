//! Cursor: single-pass external iterator over a set's storage.
//!
//! An active cursor holds a strong reference to the table, which keeps the
//! owning set from mutating it. The reference is released the moment the
//! cursor runs out of keys, so an exhausted cursor no longer blocks writers.

use crate::chained_table::{ChainedTable, Position};
use crate::codec::{KeyCodec, KeyKind};
use crate::error::SetError;
use core::fmt;
use core::hash::BuildHasher;
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;
use serde_json::Value;
use std::rc::Rc;

enum State<K, S> {
    Active {
        table: Rc<ChainedTable<K, S>>,
        pos: Position,
    },
    Exhausted,
}

pub struct Cursor<C: KeyCodec, S = DefaultHashBuilder> {
    state: State<C::Key, S>,
    _codec: PhantomData<C>,
}

impl<C, S> Cursor<C, S>
where
    C: KeyCodec,
    S: BuildHasher + Clone + Default,
{
    pub(crate) fn new(table: Rc<ChainedTable<C::Key, S>>) -> Self {
        let state = match table.first_position() {
            Some(pos) => State::Active { table, pos },
            None => State::Exhausted,
        };
        Self {
            state,
            _codec: PhantomData,
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    /// Yield the key under the cursor and move past it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Value, SetError> {
        let State::Active { table, pos } = &mut self.state else {
            return Err(SetError::IteratorExhausted);
        };
        let (key, next) = table.step(*pos).ok_or(SetError::IteratorExhausted)?;
        let value = C::encode(key);
        match next {
            Some(p) => *pos = p,
            None => {
                log::debug!("{} cursor exhausted", C::kind_name());
                self.state = State::Exhausted;
            }
        }
        Ok(value)
    }

    pub fn kind(&self) -> KeyKind {
        C::KIND
    }
}

impl<C, S> fmt::Debug for Cursor<C, S>
where
    C: KeyCodec,
    S: BuildHasher + Clone + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("type", &C::kind_name())
            .field("has_next", &self.has_next())
            .finish()
    }
}
