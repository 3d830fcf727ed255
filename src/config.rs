//! Choosing a tree implementation at runtime.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::Error;
use crate::{Autocompleter, CompressedPrefixTree, SimplePrefixTree};

/// Which tree implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// [`SimplePrefixTree`]: one node per token.
    Simple,
    /// [`CompressedPrefixTree`]: single-child chains merged into one edge.
    #[default]
    Compressed,
}

impl TreeKind {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            TreeKind::Simple => "simple",
            TreeKind::Compressed => "compressed",
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(TreeKind::Simple),
            "compressed" => Ok(TreeKind::Compressed),
            _ => Err(Error::UnknownTreeKind(s.to_string())),
        }
    }
}

/// Configuration for building a tree behind the [`Autocompleter`] trait.
#[derive(Debug, Clone)]
pub struct Config {
    /// Implementation to build.
    pub kind: TreeKind,
    /// Expected number of distinct values, used to size the value index.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kind: TreeKind::default(),
            initial_capacity: 1024,
        }
    }
}

impl Config {
    /// Default configuration for the given kind.
    pub fn new(kind: TreeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Build an empty tree.
    pub fn build<T, V>(&self) -> Box<dyn Autocompleter<T, V> + Send + Sync>
    where
        T: Clone + Eq + Send + Sync + 'static,
        V: Clone + Eq + Hash + Send + Sync + 'static,
    {
        match self.kind {
            TreeKind::Simple => Box::new(SimplePrefixTree::with_capacity(self.initial_capacity)),
            TreeKind::Compressed => {
                Box::new(CompressedPrefixTree::with_capacity(self.initial_capacity))
            }
        }
    }
}
