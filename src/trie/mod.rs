//! Persistent trie with structural sharing
//!
//! This implements a copy-on-write trie where:
//! - Every mutation returns a new tree and leaves the input untouched
//! - Nodes on the edited path are freshly allocated, everything else is
//!   shared by reference between the old and new tree
//! - A node is never mutated once reachable from a published tree

mod node;
mod tree;

pub use node::{TrieNode, TrieValue};
pub use tree::Trie;
