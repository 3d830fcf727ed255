//! Node representation shared by both tree variants.
//!
//! A node is one of three states:
//!
//! - `Empty`: only ever the root of a tree with no values.
//! - `Leaf`: one stored value and its accumulated weight.
//! - `Internal`: an edge label, the total weight below it, and children
//!   sorted by non-increasing weight.
//!
//! Labels are stored per edge. The prefix a node stands for is the
//! concatenation of the labels on the path from the root.

use std::cmp::Ordering;
use std::mem;

use smallvec::SmallVec;

use crate::Weight;

/// Edge label. Most edges are a handful of tokens long.
pub(crate) type Label<T> = SmallVec<[T; 4]>;

pub(crate) enum Node<T, V> {
    Empty,
    Leaf {
        value: V,
        weight: Weight,
        /// Creation order of the value, used to break weight ties.
        stamp: u64,
    },
    Internal {
        label: Label<T>,
        weight: Weight,
        children: Vec<Node<T, V>>,
    },
}

impl<T, V> Default for Node<T, V> {
    fn default() -> Self {
        Node::Empty
    }
}

impl<T, V> Node<T, V> {
    pub(crate) fn leaf(value: V, weight: Weight, stamp: u64) -> Self {
        Node::Leaf {
            value,
            weight,
            stamp,
        }
    }

    /// Build an internal node, sorting `children` and summing their weights.
    pub(crate) fn internal(label: Label<T>, children: Vec<Self>) -> Self {
        let mut node = Node::Internal {
            label,
            weight: 0.0,
            children,
        };
        node.refresh();
        node
    }

    #[inline]
    pub(crate) fn weight(&self) -> Weight {
        match self {
            Node::Empty => 0.0,
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    #[inline]
    pub(crate) fn is_internal(&self) -> bool {
        matches!(self, Node::Internal { .. })
    }

    /// Edge label; empty for leaves and the empty root.
    #[inline]
    pub(crate) fn label(&self) -> &[T] {
        match self {
            Node::Internal { label, .. } => label,
            _ => &[],
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> &[Self] {
        match self {
            Node::Internal { children, .. } => children,
            _ => &[],
        }
    }

    /// Re-sort children by non-increasing weight and recompute the total.
    ///
    /// The sort is stable, so equal-weight siblings keep their order.
    pub(crate) fn refresh(&mut self) {
        if let Node::Internal {
            weight, children, ..
        } = self
        {
            children.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
            *weight = children.iter().map(Node::weight).sum();
        }
    }

    /// Append a child and return its index. Only valid on internal nodes.
    pub(crate) fn push_child(&mut self, child: Self) -> usize {
        debug_assert!(self.is_internal(), "push_child on a non-internal node");
        match self {
            Node::Internal { children, .. } => {
                children.push(child);
                children.len() - 1
            }
            _ => 0,
        }
    }

    /// Detach the child at `idx`, leaving `Empty` in its slot.
    fn take_child(&mut self, idx: usize) -> Self {
        match self {
            Node::Internal { children, .. } => {
                children.get_mut(idx).map(mem::take).unwrap_or_default()
            }
            _ => Node::Empty,
        }
    }

    /// Put `child` back into slot `idx`, or drop the slot when `child` is `None`.
    fn restore_child(&mut self, idx: usize, child: Option<Self>) {
        if let Node::Internal { children, .. } = self {
            match child {
                Some(child) => children[idx] = child,
                None => {
                    children.remove(idx);
                }
            }
        }
    }

    /// Follow a path of child indices from this node.
    pub(crate) fn descendant(&self, path: &[usize]) -> Option<&Self> {
        path.iter().try_fold(self, |node, &idx| node.children().get(idx))
    }

    /// Split this internal node's label at `at`, keeping the tail and
    /// returning the head.
    pub(crate) fn split_label(&mut self, at: usize) -> Label<T>
    where
        T: Clone,
    {
        match self {
            Node::Internal { label, .. } => {
                let tail = Label::from(&label[at..]);
                let mut head = mem::replace(label, tail);
                head.truncate(at);
                head
            }
            _ => Label::new(),
        }
    }

    /// Merge a lone internal child into this node, concatenating labels.
    ///
    /// Returns `false` and leaves the node alone unless it has exactly one
    /// child and that child is internal.
    pub(crate) fn absorb_only_child(&mut self) -> bool {
        let Node::Internal {
            label,
            weight,
            children,
        } = self
        else {
            return false;
        };
        if children.len() != 1 || !children[0].is_internal() {
            return false;
        }
        if let Some(Node::Internal {
            label: child_label,
            weight: child_weight,
            children: grandchildren,
        }) = children.pop()
        {
            label.extend(child_label);
            *weight = child_weight;
            *children = grandchildren;
        }
        true
    }

    /// Tear down the subtree without recursion, handing each stored value
    /// to `on_value`.
    pub(crate) fn dismantle(self, mut on_value: impl FnMut(V)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Empty => {}
                Node::Leaf { value, .. } => on_value(value),
                Node::Internal { children, .. } => stack.extend(children),
            }
        }
    }
}

impl<T: PartialEq, V: PartialEq> Node<T, V> {
    /// Index of the internal child whose edge starts with `token`.
    pub(crate) fn child_towards(&self, token: &T) -> Option<usize> {
        self.children()
            .iter()
            .position(|child| child.is_internal() && child.label().first() == Some(token))
    }

    /// Add `weight` to the leaf child holding `value`, or attach a new leaf.
    ///
    /// Does not re-sort; callers refresh the node afterwards. Only valid on
    /// internal nodes.
    pub(crate) fn upsert_leaf(&mut self, value: V, extra: Weight, stamp: u64) {
        debug_assert!(self.is_internal(), "upsert_leaf on a non-internal node");
        let Node::Internal { children, .. } = self else {
            return;
        };
        let existing = children.iter_mut().find_map(|child| match child {
            Node::Leaf {
                value: stored,
                weight,
                ..
            } if *stored == value => Some(weight),
            _ => None,
        });
        match existing {
            Some(weight) => *weight += extra,
            None => children.push(Node::leaf(value, extra, stamp)),
        }
    }
}

/// Length of the longest common prefix of `a` and `b`.
#[inline]
pub(crate) fn common_prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Nodes detached from the tree while walking down, each paired with the
/// slot its child on the path was taken from.
///
/// Walks take ownership of the path instead of recursing, so the depth of a
/// tree never touches the call stack.
pub(crate) struct Spine<T, V> {
    frames: Vec<(Node<T, V>, usize)>,
}

impl<T, V> Spine<T, V> {
    pub(crate) fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Detach child `idx` of `parent`, keeping `parent` on the spine.
    pub(crate) fn descend(&mut self, mut parent: Node<T, V>, idx: usize) -> Node<T, V> {
        let child = parent.take_child(idx);
        self.frames.push((parent, idx));
        child
    }

    /// Reattach the spine bottom-up.
    ///
    /// Each parent gets its child back (or loses the slot when the child is
    /// `None`), is refreshed, and is then passed through `settle`, which may
    /// reshape it or drop it altogether. Returns the new root.
    pub(crate) fn unwind(
        mut self,
        mut node: Option<Node<T, V>>,
        mut settle: impl FnMut(Node<T, V>) -> Option<Node<T, V>>,
    ) -> Option<Node<T, V>> {
        while let Some((mut parent, idx)) = self.frames.pop() {
            parent.restore_child(idx, node);
            parent.refresh();
            node = settle(parent);
        }
        node
    }
}

/// Collect every leaf under `node` and rank them: heaviest first, earliest
/// inserted first among equal weights.
pub(crate) fn ranked<T, V: Clone>(node: &Node<T, V>, limit: Option<usize>) -> Vec<(V, Weight)> {
    let mut hits: Vec<(&V, Weight, u64)> = Vec::new();
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        match node {
            Node::Empty => {}
            Node::Leaf {
                value,
                weight,
                stamp,
            } => hits.push((value, *weight, *stamp)),
            Node::Internal { children, .. } => stack.extend(children.iter()),
        }
    }

    hits.sort_unstable_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.2.cmp(&b.2),
        ord => ord,
    });
    if let Some(limit) = limit {
        hits.truncate(limit);
    }
    hits.into_iter()
        .map(|(value, weight, _)| (value.clone(), weight))
        .collect()
}
