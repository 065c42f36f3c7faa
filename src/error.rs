//! Errors surfaced by set, cursor and configuration operations.

use crate::codec::KeyKind;
use thiserror::Error;

/// Every failure is reported at the offending call and leaves the set
/// exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetError {
    #[error("no key provided")]
    MissingArgument,
    #[error("invalid key type provided, expected {expected}")]
    InvalidKeyType { expected: KeyKind },
    #[error("iterator has no more keys")]
    IteratorExhausted,
    #[error("set cannot be modified while a cursor is outstanding")]
    ConcurrentModification,
    #[error("invalid table configuration: {0}")]
    InvalidConfig(&'static str),
    /// The bucket array cannot be sized for this many keys.
    #[error("capacity overflow: cannot size the table for {0} keys")]
    CapacityOverflow(usize),
    #[error("unknown key kind: {0:?}")]
    UnknownKeyKind(String),
}
