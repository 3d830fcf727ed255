//! Value → sequence index.
//!
//! Every stored value is recorded here alongside the sequence it was first
//! inserted under. This is what answers `len` in O(1) and what lets insert
//! reject a value re-inserted under a different sequence before touching
//! the tree.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};

pub(crate) struct ValueIndex<T, V> {
    sequences: HashMap<V, Box<[T]>>,
}

impl<T, V> ValueIndex<T, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sequences: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.sequences.len()
    }
}

impl<T: Clone + PartialEq, V: Eq + Hash> ValueIndex<T, V> {
    /// Whether `value` is already stored.
    ///
    /// Fails with [`Error::SequenceMismatch`] when it is stored under a
    /// sequence other than `sequence`.
    pub(crate) fn check(&self, value: &V, sequence: &[T]) -> Result<bool> {
        match self.sequences.get(value) {
            None => Ok(false),
            Some(stored) if **stored == *sequence => Ok(true),
            Some(_) => Err(Error::SequenceMismatch),
        }
    }

    pub(crate) fn record(&mut self, value: V, sequence: &[T]) {
        self.sequences.insert(value, sequence.into());
    }

    pub(crate) fn forget(&mut self, value: &V) -> bool {
        self.sequences.remove(value).is_some()
    }

    pub(crate) fn sequence(&self, value: &V) -> Option<&[T]> {
        self.sequences.get(value).map(|s| &**s)
    }
}
