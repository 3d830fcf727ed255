//! Diagnostics: integrity checks, node statistics and indented rendering.
//!
//! Everything here walks the tree with an explicit stack so it is safe on
//! character-level trees thousands of levels deep.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::index::ValueIndex;
use crate::node::Node;

/// Node counts for a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Internal (branching) nodes, the root included.
    pub internal_nodes: usize,
    /// Leaves, one per stored value.
    pub leaves: usize,
    /// Depth of the deepest node, counting the root as depth 0.
    pub max_depth: usize,
}

/// Which shape rules apply on top of the shared invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Simple,
    Compressed,
}

/// Pre-order walk. `visit` receives each node with its depth and the
/// accumulated prefix up to and including the node's own label.
fn walk<'a, T: Clone, V>(
    root: &'a Node<T, V>,
    mut visit: impl FnMut(&'a Node<T, V>, usize, &[T]),
) {
    enum Step<'a, T, V> {
        Enter(&'a Node<T, V>, usize),
        Leave(usize),
    }

    let mut prefix: Vec<T> = Vec::new();
    let mut stack = vec![Step::Enter(root, 0)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Leave(mark) => prefix.truncate(mark),
            Step::Enter(node, depth) => {
                let mark = prefix.len();
                prefix.extend_from_slice(node.label());
                visit(node, depth, &prefix);
                stack.push(Step::Leave(mark));
                for child in node.children().iter().rev() {
                    stack.push(Step::Enter(child, depth + 1));
                }
            }
        }
    }
}

pub(crate) fn stats<T, V>(root: &Node<T, V>) -> TreeStats {
    let mut stats = TreeStats::default();
    if root.is_empty() {
        return stats;
    }
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        stats.max_depth = stats.max_depth.max(depth);
        match node {
            Node::Empty => {}
            Node::Leaf { .. } => stats.leaves += 1,
            Node::Internal { children, .. } => {
                stats.internal_nodes += 1;
                stack.extend(children.iter().map(|child| (child, depth + 1)));
            }
        }
    }
    stats
}

/// Sum tolerance: children are summed in one order at refresh time, so the
/// stored total matches exactly unless someone skipped a refresh.
fn weights_match(total: f64, sum: f64, terms: usize) -> bool {
    total == sum || (total - sum).abs() <= f64::EPSILON * total.abs().max(1.0) * terms as f64
}

pub(crate) fn verify<T, V>(
    root: &Node<T, V>,
    index: &ValueIndex<T, V>,
    shape: Shape,
) -> Vec<String>
where
    T: Clone + Eq,
    V: Eq + Hash,
{
    let mut issues = Vec::new();

    if root.is_empty() {
        if index.len() != 0 {
            issues.push(format!("empty tree but index holds {} values", index.len()));
        }
        return issues;
    }
    if !root.is_internal() {
        issues.push("root is a bare leaf".to_string());
        return issues;
    }
    if shape == Shape::Simple && !root.label().is_empty() {
        issues.push(format!("simple root label has {} tokens", root.label().len()));
    }

    let mut seen: HashSet<&V> = HashSet::new();
    walk(root, |node, depth, prefix| match node {
        Node::Empty => issues.push(format!("empty node at depth {depth}")),
        Node::Leaf { value, weight, .. } => {
            if !(weight.is_finite() && *weight > 0.0) {
                issues.push(format!("leaf at depth {depth} has weight {weight}"));
            }
            if !seen.insert(value) {
                issues.push(format!("value stored twice (second copy at depth {depth})"));
            }
            match index.sequence(value) {
                None => issues.push(format!("leaf at depth {depth} missing from index")),
                Some(sequence) if sequence != prefix => {
                    issues.push(format!("leaf at depth {depth} hangs off the wrong prefix"))
                }
                Some(_) => {}
            }
        }
        Node::Internal {
            label,
            weight,
            children,
        } => {
            if children.is_empty() {
                issues.push(format!("internal node at depth {depth} has no children"));
            }

            let sum: f64 = children.iter().map(Node::weight).sum();
            if !weights_match(*weight, sum, children.len()) {
                issues.push(format!(
                    "internal node at depth {depth}: weight {weight} != children sum {sum}"
                ));
            }

            if let Some(i) = children
                .windows(2)
                .position(|pair| pair[0].weight() < pair[1].weight())
            {
                issues.push(format!("children of node at depth {depth} out of order at {i}"));
            }

            for (i, child) in children.iter().enumerate() {
                let Some(first) = child.label().first() else {
                    if child.is_internal() {
                        issues.push(format!(
                            "internal child at depth {} has empty label",
                            depth + 1
                        ));
                    }
                    continue;
                };
                if children[..i]
                    .iter()
                    .any(|c| c.is_internal() && c.label().first() == Some(first))
                {
                    issues.push(format!("siblings at depth {} share a first token", depth + 1));
                }
            }

            match shape {
                Shape::Simple => {
                    if depth > 0 && label.len() != 1 {
                        issues.push(format!(
                            "simple node at depth {depth} has a {}-token label",
                            label.len()
                        ));
                    }
                }
                Shape::Compressed => {
                    if children.len() == 1 && children[0].is_internal() {
                        issues.push(format!(
                            "compressible chain at depth {depth}: only child is internal"
                        ));
                    }
                }
            }
        }
    });

    if seen.len() != index.len() {
        issues.push(format!(
            "{} leaves reachable but index holds {} values",
            seen.len(),
            index.len()
        ));
    }
    issues
}

/// One line per node, two spaces per level: `prefix (weight)` for internal
/// nodes and `value (weight)` for leaves. An empty tree renders as nothing.
pub(crate) fn render<T, V>(root: &Node<T, V>, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: fmt::Debug + Clone,
    V: fmt::Debug,
{
    if root.is_empty() {
        return Ok(());
    }
    let mut result = Ok(());
    walk(root, |node, depth, prefix| {
        if result.is_err() {
            return;
        }
        let indent = depth * 2;
        result = match node {
            Node::Empty => Ok(()),
            Node::Leaf { value, weight, .. } => {
                writeln!(f, "{:indent$}{value:?} ({weight:?})", "")
            }
            Node::Internal { weight, .. } => {
                writeln!(f, "{:indent$}{prefix:?} ({weight:?})", "")
            }
        };
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn stats_of_empty_tree() {
        let root: Node<char, u32> = Node::Empty;
        assert_eq!(stats(&root), TreeStats::default());
    }

    #[test]
    fn verify_flags_broken_nodes() {
        let mut index: ValueIndex<char, u32> = ValueIndex::with_capacity(2);
        index.record(1, &['a']);
        index.record(2, &['b']);

        // Children out of order and a stale total.
        let root = Node::Internal {
            label: smallvec![],
            weight: 10.0,
            children: vec![
                Node::Internal {
                    label: smallvec!['a'],
                    weight: 1.0,
                    children: vec![Node::leaf(1, 1.0, 0)],
                },
                Node::Internal {
                    label: smallvec!['b'],
                    weight: 2.0,
                    children: vec![Node::leaf(2, 2.0, 1)],
                },
            ],
        };
        let issues = verify(&root, &index, Shape::Simple);
        assert!(issues.iter().any(|i| i.contains("out of order")), "{issues:?}");
        assert!(issues.iter().any(|i| i.contains("children sum")), "{issues:?}");

        let chain = Node::internal(
            smallvec!['a'],
            vec![Node::internal(smallvec!['b'], vec![Node::leaf(1, 1.0, 0)])],
        );
        let mut index: ValueIndex<char, u32> = ValueIndex::with_capacity(1);
        index.record(1, &['a', 'b']);
        let issues = verify(&chain, &index, Shape::Compressed);
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert!(issues[0].contains("compressible chain"));
    }

    #[test]
    fn weights_match_at_the_top_of_the_range() {
        assert!(weights_match(f64::MAX, f64::MAX, 2));
        assert!(weights_match(f64::INFINITY, f64::INFINITY, 2));
        assert!(weights_match(3.0, 1.0 + 2.0, 2));
        assert!(!weights_match(10.0, 3.0, 2));
    }

    #[test]
    fn verify_checks_leaf_prefix_against_index() {
        let mut index: ValueIndex<char, u32> = ValueIndex::with_capacity(1);
        index.record(7, &['x']);
        let root = Node::internal(smallvec!['y'], vec![Node::leaf(7, 1.0, 0)]);
        let issues = verify(&root, &index, Shape::Compressed);
        assert!(issues.iter().any(|i| i.contains("wrong prefix")), "{issues:?}");
    }
}
