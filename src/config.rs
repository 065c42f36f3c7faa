//! Table sizing configuration.

use crate::error::SetError;
use serde::{Deserialize, Serialize};

/// Initial bucket count and growth threshold of a chaining table.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub initial_buckets: usize,
    /// Maximum average chain length before the bucket array grows.
    pub max_load_factor: f32,
}

impl TableConfig {
    pub const DEFAULT_BUCKETS: usize = 8;
    pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;
    /// Smallest accepted load factor: at most ten buckets per key.
    pub const MIN_MAX_LOAD_FACTOR: f32 = 0.1;
    /// Upper bound on the bucket array length, initial or grown.
    pub const MAX_BUCKETS: usize = 1 << 30;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_buckets(mut self, n: usize) -> Self {
        self.initial_buckets = n;
        self
    }

    pub fn max_load_factor(mut self, f: f32) -> Self {
        self.max_load_factor = f;
        self
    }

    pub fn validate(&self) -> Result<(), SetError> {
        if self.initial_buckets == 0 || self.initial_buckets > Self::MAX_BUCKETS {
            return Err(SetError::InvalidConfig(
                "initial_buckets must be between 1 and MAX_BUCKETS",
            ));
        }
        if !self.max_load_factor.is_finite() || self.max_load_factor < Self::MIN_MAX_LOAD_FACTOR {
            return Err(SetError::InvalidConfig(
                "max_load_factor must be finite and at least MIN_MAX_LOAD_FACTOR",
            ));
        }
        Ok(())
    }

    /// Smallest bucket count that holds `len` keys within the load factor,
    /// or `None` when that exceeds `MAX_BUCKETS`.
    pub(crate) fn buckets_for(&self, len: usize) -> Option<usize> {
        let needed = (len as f64 / self.max_load_factor as f64).ceil();
        if needed > Self::MAX_BUCKETS as f64 {
            None
        } else {
            Some((needed as usize).max(1))
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: Self::DEFAULT_BUCKETS,
            max_load_factor: Self::DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}
