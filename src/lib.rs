//! # prefix-autocomplete
//!
//! Weighted prefix matching over token sequences.
//!
//! Values are inserted with a positive weight under a sequence of tokens
//! (characters, words, note intervals: anything comparable by equality).
//! A query returns every value whose sequence starts with the queried
//! prefix, heaviest first. Removal drops everything under a prefix.
//!
//! Two trees implement the [`Autocompleter`] contract:
//!
//! - [`SimplePrefixTree`] branches on one token per level.
//! - [`CompressedPrefixTree`] merges single-child chains into one edge
//!   labelled with the whole shared run.
//!
//! Both keep every internal node's weight equal to the sum of its children
//! and keep children sorted by non-increasing weight. Equal weights rank
//! the earlier-inserted value first.
//!
//! ## Example
//!
//! ```rust
//! use prefix_autocomplete::{Autocompleter, CompressedPrefixTree};
//!
//! let mut tree: CompressedPrefixTree<char, &str> = CompressedPrefixTree::new();
//! tree.insert("cat", 1.0, &['c', 'a', 't']).unwrap();
//! tree.insert("car", 2.0, &['c', 'a', 'r']).unwrap();
//!
//! assert_eq!(
//!     tree.autocomplete(&['c', 'a'], None).unwrap(),
//!     vec![("car", 2.0), ("cat", 1.0)]
//! );
//! assert_eq!(tree.autocomplete(&['c'], Some(1)).unwrap(), vec![("car", 2.0)]);
//!
//! tree.remove(&['c', 'a']);
//! assert!(tree.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compressed;
pub mod config;
mod debug;
pub mod error;
mod index;
mod node;
pub mod simple;
pub mod sync;

#[cfg(test)]
mod proptests;

pub use compressed::CompressedPrefixTree;
pub use config::{Config, TreeKind};
pub use debug::TreeStats;
pub use error::{Error, Result};
pub use simple::SimplePrefixTree;
pub use sync::SharedAutocompleter;

/// Weight attached to a stored value. Always finite and positive.
pub type Weight = f64;

/// A weighted prefix index.
///
/// `T` is the token type and `V` the stored value type. Values are compared
/// by equality: inserting a value that is already stored adds to its weight.
pub trait Autocompleter<T, V> {
    /// Number of distinct stored values.
    fn len(&self) -> usize;

    /// Whether no values are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `value` under `sequence`, or add `weight` to it if already stored.
    ///
    /// Fails with [`Error::InvalidWeight`] unless `weight` is finite and
    /// positive and the tree's total stays finite, and with
    /// [`Error::SequenceMismatch`] if `value` is already stored under a
    /// different sequence. A failed insert changes nothing.
    fn insert(&mut self, value: V, weight: Weight, sequence: &[T]) -> Result<()>;

    /// Values whose sequence starts with `prefix`, by non-increasing weight.
    ///
    /// At most `limit` entries are returned; `None` returns all of them.
    /// Fails with [`Error::InvalidLimit`] for `Some(0)`. No match is an empty
    /// list, not an error.
    fn autocomplete(&self, prefix: &[T], limit: Option<usize>) -> Result<Vec<(V, Weight)>>;

    /// Remove every value whose sequence starts with `prefix`.
    ///
    /// Returns how many values were removed.
    fn remove(&mut self, prefix: &[T]) -> usize;
}

impl<T, V, A: Autocompleter<T, V> + ?Sized> Autocompleter<T, V> for Box<A> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn insert(&mut self, value: V, weight: Weight, sequence: &[T]) -> Result<()> {
        (**self).insert(value, weight, sequence)
    }

    fn autocomplete(&self, prefix: &[T], limit: Option<usize>) -> Result<Vec<(V, Weight)>> {
        (**self).autocomplete(prefix, limit)
    }

    fn remove(&mut self, prefix: &[T]) -> usize {
        (**self).remove(prefix)
    }
}
