//! Shared access to a tree behind one coarse lock.
//!
//! No tree operation splits into independent steps without breaking the
//! weight and ordering invariants, so the whole tree sits behind a single
//! reader-writer lock: queries share it, mutations take it exclusively.

use std::marker::PhantomData;

use parking_lot::RwLock;

use crate::error::Result;
use crate::{Autocompleter, Weight};

/// A tree that can be queried and updated through `&self` from many threads.
///
/// ```rust
/// use prefix_autocomplete::{CompressedPrefixTree, SharedAutocompleter};
///
/// let tree = SharedAutocompleter::new(CompressedPrefixTree::<char, u32>::new());
/// std::thread::scope(|s| {
///     for i in 0..4u32 {
///         let tree = &tree;
///         s.spawn(move || tree.insert(i, 1.0, &['x', 'y']).unwrap());
///     }
/// });
/// assert_eq!(tree.len(), 4);
/// ```
pub struct SharedAutocompleter<T, V, A = Box<dyn Autocompleter<T, V> + Send + Sync>> {
    inner: RwLock<A>,
    _marker: PhantomData<fn() -> (T, V)>,
}

impl<T, V, A> SharedAutocompleter<T, V, A> {
    /// Wrap a tree.
    pub fn new(tree: A) -> Self {
        Self {
            inner: RwLock::new(tree),
            _marker: PhantomData,
        }
    }

    /// Unwrap the tree.
    pub fn into_inner(self) -> A {
        self.inner.into_inner()
    }

    /// Run `f` with shared access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&*self.inner.read())
    }
}

impl<T, V, A: Autocompleter<T, V>> SharedAutocompleter<T, V, A> {
    /// Insert under the write lock. See [`Autocompleter::insert`].
    pub fn insert(&self, value: V, weight: Weight, sequence: &[T]) -> Result<()> {
        self.inner.write().insert(value, weight, sequence)
    }

    /// Query under the read lock. See [`Autocompleter::autocomplete`].
    pub fn autocomplete(&self, prefix: &[T], limit: Option<usize>) -> Result<Vec<(V, Weight)>> {
        self.inner.read().autocomplete(prefix, limit)
    }

    /// Remove under the write lock. See [`Autocompleter::remove`].
    pub fn remove(&self, prefix: &[T]) -> usize {
        self.inner.write().remove(prefix)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<T, V, A: Default> Default for SharedAutocompleter<T, V, A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}
