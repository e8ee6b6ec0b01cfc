//! Keyword trie for multi-pattern string matching.
//!
//! This module provides an Aho-Corasick automaton over a dictionary of
//! keywords. The front end uses it in two ways:
//!
//! - to classify the syntactic form of a source line (`x'`, `dx/dt`, `par`, ...)
//!   and to check whether a name is exactly a reserved word (whole-word mode)
//! - to find every occurrence of a known name inside an expression string so
//!   the expander can substitute it
//!
//! ## Structure
//!
//! Nodes live in a contiguous arena owned by the [`Trie`] and are addressed by
//! [`NodeId`]. Parent, failure and output links are indices into the same
//! arena. Configuration (case sensitivity, whole-word mode) is fixed by the
//! [`TrieBuilder`] before the first keyword is inserted.
//!
//! ## Example
//!
//! ```
//! use xode_core::trie::TrieBuilder;
//!
//! let trie = TrieBuilder::new().build_from(["he", "she", "hers"]).unwrap();
//! let matches = trie.scan("ushers");
//! let found: Vec<&str> = matches.iter().map(|m| m.keyword.as_str()).collect();
//! assert_eq!(found, vec!["she", "he", "hers"]);
//! ```

mod automaton;
mod node;

pub use automaton::{Match, Trie, TrieBuilder};
pub use node::NodeId;
