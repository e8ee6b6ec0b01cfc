//! Arena node types for the keyword trie.

use std::fmt;

/// Index of a node in the trie arena.
/// Node 0 is always the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root node (always index 0).
    pub const ROOT: NodeId = NodeId(0);

    /// Check if this is the root node.
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "root")
        } else {
            write!(f, "n{}", self.0)
        }
    }
}

/// A single state of the automaton.
#[derive(Debug, Clone)]
pub(crate) struct TrieNode {
    /// Path length from the root
    pub depth: usize,
    /// Character labelling the incoming edge (`'\0'` for the root)
    pub edge: char,
    /// Index into the keyword list if a keyword ends here
    pub terminal: Option<usize>,
    /// Parent node (the root is its own parent)
    pub parent: NodeId,
    /// Node of the longest proper suffix that is also a trie path
    pub failure: NodeId,
    /// Nearest terminal node along the failure chain, or the root
    pub output: NodeId,
    /// Child nodes in insertion order
    pub children: Vec<NodeId>,
}

impl TrieNode {
    /// Create the root node.
    pub fn root() -> Self {
        Self {
            depth: 0,
            edge: '\0',
            terminal: None,
            parent: NodeId::ROOT,
            failure: NodeId::ROOT,
            output: NodeId::ROOT,
            children: Vec::new(),
        }
    }

    /// Create a fresh child below `parent`. Links start out at the root.
    pub fn child(parent: NodeId, depth: usize, edge: char) -> Self {
        Self {
            depth,
            edge,
            terminal: None,
            parent,
            failure: NodeId::ROOT,
            output: NodeId::ROOT,
            children: Vec::new(),
        }
    }
}
