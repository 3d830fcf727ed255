//! Uncompressed prefix tree: one token per level.
//!
//! The root has an empty label and every other internal node extends its
//! parent's prefix by exactly one token. Values hang as leaves below the
//! internal node whose prefix equals their sequence.

use std::fmt;
use std::hash::Hash;
use std::mem;

use smallvec::smallvec;
use tracing::{debug, trace};

use crate::debug::{self, Shape, TreeStats};
use crate::error::{ensure_limit, ensure_total, ensure_weight, Result};
use crate::index::ValueIndex;
use crate::node::{ranked, Label, Node, Spine};
use crate::{Autocompleter, Weight};

/// A trie branching on one token at a time.
///
/// # Example
///
/// ```rust
/// use prefix_autocomplete::{Autocompleter, SimplePrefixTree};
///
/// let mut tree: SimplePrefixTree<char, &str> = SimplePrefixTree::new();
/// tree.insert("cat", 1.0, &['c', 'a', 't']).unwrap();
/// tree.insert("car", 2.0, &['c', 'a', 'r']).unwrap();
///
/// let hits = tree.autocomplete(&['c', 'a'], None).unwrap();
/// assert_eq!(hits, vec![("car", 2.0), ("cat", 1.0)]);
/// ```
pub struct SimplePrefixTree<T, V> {
    root: Node<T, V>,
    index: ValueIndex<T, V>,
    next_stamp: u64,
}

impl<T, V> SimplePrefixTree<T, V> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty tree with room for `capacity` values in its index.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            root: Node::Empty,
            index: ValueIndex::with_capacity(capacity),
            next_stamp: 0,
        }
    }

    /// Node and depth counts.
    pub fn stats(&self) -> TreeStats {
        debug::stats(&self.root)
    }
}

impl<T: Clone + Eq, V: Clone + Eq + Hash> SimplePrefixTree<T, V> {
    /// Child indices from the root to the node whose prefix equals `prefix`.
    fn locate(&self, prefix: &[T]) -> Option<Vec<usize>> {
        if self.root.is_empty() {
            return None;
        }
        let mut node = &self.root;
        let mut path = Vec::with_capacity(prefix.len());
        for token in prefix {
            let idx = node.child_towards(token)?;
            path.push(idx);
            node = &node.children()[idx];
        }
        Some(path)
    }

    /// Check every structural invariant; returns one message per violation.
    pub fn verify_integrity(&self) -> Vec<String> {
        debug::verify(&self.root, &self.index, Shape::Simple)
    }
}

impl<T: Clone + Eq, V: Clone + Eq + Hash> Autocompleter<T, V> for SimplePrefixTree<T, V> {
    fn len(&self) -> usize {
        self.index.len()
    }

    fn insert(&mut self, value: V, weight: Weight, sequence: &[T]) -> Result<()> {
        ensure_weight(weight)?;
        ensure_total(self.root.weight(), weight)?;
        let stamp = self.next_stamp;
        if !self.index.check(&value, sequence)? {
            self.index.record(value.clone(), sequence);
            self.next_stamp += 1;
        }

        let mut node = match mem::take(&mut self.root) {
            Node::Empty => Node::internal(Label::new(), Vec::new()),
            root => root,
        };
        let mut spine = Spine::new();
        for token in sequence {
            let idx = match node.child_towards(token) {
                Some(idx) => idx,
                None => node.push_child(Node::internal(smallvec![token.clone()], Vec::new())),
            };
            node = spine.descend(node, idx);
        }
        node.upsert_leaf(value, weight, stamp);
        node.refresh();

        self.root = spine.unwind(Some(node), Some).unwrap_or_default();
        trace!(depth = sequence.len(), weight, "inserted");
        Ok(())
    }

    fn autocomplete(&self, prefix: &[T], limit: Option<usize>) -> Result<Vec<(V, Weight)>> {
        ensure_limit(limit)?;
        let found = self
            .locate(prefix)
            .and_then(|path| self.root.descendant(&path));
        Ok(found.map(|node| ranked(node, limit)).unwrap_or_default())
    }

    fn remove(&mut self, prefix: &[T]) -> usize {
        let Some(path) = self.locate(prefix) else {
            return 0;
        };

        let mut node = mem::take(&mut self.root);
        let mut spine = Spine::new();
        for &idx in &path {
            node = spine.descend(node, idx);
        }

        let mut removed = 0;
        let index = &mut self.index;
        node.dismantle(|value| {
            if index.forget(&value) {
                removed += 1;
            }
        });

        self.root = spine
            .unwind(None, |parent| {
                if parent.children().is_empty() {
                    debug!(label_len = parent.label().len(), "pruned childless node");
                    None
                } else {
                    Some(parent)
                }
            })
            .unwrap_or_default();
        if self.root.is_empty() {
            debug!("tree emptied");
        }
        trace!(removed, depth = prefix.len(), "removed prefix");
        removed
    }
}

impl<T, V> Default for SimplePrefixTree<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V> Drop for SimplePrefixTree<T, V> {
    fn drop(&mut self) {
        mem::take(&mut self.root).dismantle(drop);
    }
}

impl<T: fmt::Debug + Clone, V: fmt::Debug> fmt::Display for SimplePrefixTree<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug::render(&self.root, f)
    }
}

impl<T, V> fmt::Debug for SimplePrefixTree<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplePrefixTree")
            .field("len", &self.index.len())
            .field("weight", &self.root.weight())
            .finish_non_exhaustive()
    }
}
