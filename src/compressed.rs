//! Path-compressed prefix tree.
//!
//! Each edge carries the longest token run shared by everything below it,
//! so chains of single-child nodes never form. The root's label is the run
//! shared by every stored sequence and may be empty. Internal siblings never
//! start with the same token.
//!
//! Leaves carry no label: a value hangs below the internal node whose
//! accumulated prefix equals its sequence. An internal node whose only child
//! is a leaf is therefore required and kept; an internal node whose only
//! child is another internal node is always merged into it.

use std::fmt;
use std::hash::Hash;
use std::mem;

use tracing::{debug, trace};

use crate::debug::{self, Shape, TreeStats};
use crate::error::{ensure_limit, ensure_total, ensure_weight, Result};
use crate::index::ValueIndex;
use crate::node::{common_prefix_len, ranked, Label, Node, Spine};
use crate::{Autocompleter, Weight};

/// A radix tree over token sequences.
///
/// # Example
///
/// ```rust
/// use prefix_autocomplete::{Autocompleter, CompressedPrefixTree};
///
/// let mut tree: CompressedPrefixTree<char, &str> = CompressedPrefixTree::new();
/// tree.insert("cat", 1.0, &['c', 'a', 't']).unwrap();
/// tree.insert("cap", 1.0, &['c', 'a', 'p']).unwrap();
/// tree.insert("dog", 1.0, &['d', 'o', 'g']).unwrap();
///
/// assert_eq!(tree.autocomplete(&['c', 'a'], None).unwrap().len(), 2);
/// assert_eq!(tree.remove(&['c']), 2);
/// assert_eq!(tree.len(), 1);
/// ```
pub struct CompressedPrefixTree<T, V> {
    root: Node<T, V>,
    index: ValueIndex<T, V>,
    next_stamp: u64,
}

impl<T, V> CompressedPrefixTree<T, V> {
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

impl<T: Clone + Eq, V: Clone + Eq + Hash> CompressedPrefixTree<T, V> {
    /// Child indices from the root to the shallowest node covering `prefix`.
    ///
    /// The node found either stands for `prefix` exactly or its label runs
    /// past the end of `prefix`; in both cases everything below it matches.
    fn locate(&self, prefix: &[T]) -> Option<Vec<usize>> {
        let mut node = &self.root;
        let mut rest = prefix;
        let mut path = Vec::new();
        loop {
            if !node.is_internal() {
                return None;
            }
            let label = node.label();
            let common = common_prefix_len(label, rest);
            if common == rest.len() {
                return Some(path);
            }
            if common < label.len() {
                return None;
            }
            rest = &rest[common..];
            let idx = node.child_towards(&rest[0])?;
            path.push(idx);
            node = &node.children()[idx];
        }
    }

    /// Check every structural invariant; returns one message per violation.
    pub fn verify_integrity(&self) -> Vec<String> {
        debug::verify(&self.root, &self.index, Shape::Compressed)
    }
}

impl<T: Clone + Eq, V: Clone + Eq + Hash> Autocompleter<T, V> for CompressedPrefixTree<T, V> {
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

        let mut node = mem::take(&mut self.root);
        let mut rest = sequence;
        let mut spine = Spine::new();
        loop {
            if node.is_empty() {
                node = Node::internal(Label::from(rest), vec![Node::leaf(value, weight, stamp)]);
                debug!(label_len = rest.len(), "started tree");
                break;
            }

            let label_len = node.label().len();
            let common = common_prefix_len(node.label(), rest);

            if common == label_len && common == rest.len() {
                node.upsert_leaf(value, weight, stamp);
                node.refresh();
                break;
            }

            if common == label_len {
                let tail = &rest[common..];
                if let Some(idx) = node.child_towards(&tail[0]) {
                    node = spine.descend(node, idx);
                    rest = tail;
                    continue;
                }
                node.push_child(Node::internal(
                    Label::from(tail),
                    vec![Node::leaf(value, weight, stamp)],
                ));
                node.refresh();
                debug!(depth = spine.depth(), label_len = tail.len(), "new branch");
                break;
            }

            // The label runs past the point where it stops matching: cut it
            // at the shared run and hang the new value beside the old subtree.
            let head = node.split_label(common);
            let leaf = Node::leaf(value, weight, stamp);
            let sibling = if common == rest.len() {
                leaf
            } else {
                Node::internal(Label::from(&rest[common..]), vec![leaf])
            };
            debug!(
                depth = spine.depth(),
                shared = common,
                diverged = common < rest.len(),
                "split edge"
            );
            node = Node::internal(head, vec![node, sibling]);
            break;
        }

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
            .unwind(None, |mut parent| {
                if parent.children().is_empty() {
                    debug!(label_len = parent.label().len(), "pruned childless node");
                    return None;
                }
                if parent.absorb_only_child() {
                    debug!(label_len = parent.label().len(), "collapsed single-child chain");
                }
                Some(parent)
            })
            .unwrap_or_default();
        if self.root.is_empty() {
            debug!("tree emptied");
        }
        trace!(removed, depth = prefix.len(), "removed prefix");
        removed
    }
}

impl<T, V> Default for CompressedPrefixTree<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V> Drop for CompressedPrefixTree<T, V> {
    fn drop(&mut self) {
        mem::take(&mut self.root).dismantle(drop);
    }
}

impl<T: fmt::Debug + Clone, V: fmt::Debug> fmt::Display for CompressedPrefixTree<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug::render(&self.root, f)
    }
}

impl<T, V> fmt::Debug for CompressedPrefixTree<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedPrefixTree")
            .field("len", &self.index.len())
            .field("weight", &self.root.weight())
            .finish_non_exhaustive()
    }
}
