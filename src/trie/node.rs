//! Trie node type

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased value stored in the trie
///
/// The concrete type is recovered at lookup time via downcast; a mismatch
/// reads as an absent key. Values are shared by reference count across every
/// snapshot that contains them.
pub type TrieValue = Arc<dyn Any + Send + Sync>;

/// A node in the persistent trie
///
/// Children are indexed by the next key byte, in lexical order. A node
/// reachable from a published tree is immutable: every edit works on a fresh
/// shallow clone that is not yet visible to anyone else.
///
/// Cloning is shallow by contract: the child map is copied (bumping each
/// child's reference count) and the value is shared, never the descendants.
#[derive(Clone, Default)]
pub struct TrieNode {
    /// Children indexed by the next byte of the key
    pub(crate) children: BTreeMap<u8, Arc<TrieNode>>,
    /// True when this node terminates a stored key
    pub(crate) is_terminal: bool,
    /// The stored value; present only on terminal nodes
    pub(crate) value: Option<TrieValue>,
}

impl TrieNode {
    /// Create a node with no children and no value
    pub fn empty() -> Self {
        TrieNode::default()
    }

    /// Create a terminal node carrying `value`, keeping the given children
    pub fn with_value(children: BTreeMap<u8, Arc<TrieNode>>, value: TrieValue) -> Self {
        TrieNode {
            children,
            is_terminal: true,
            value: Some(value),
        }
    }

    /// Demote to a plain node: same children, value stripped
    pub fn without_value(&self) -> Self {
        TrieNode {
            children: self.children.clone(),
            is_terminal: false,
            value: None,
        }
    }

    /// True when this node terminates a stored key
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// The type-erased value at this node, if any
    pub fn value(&self) -> Option<&TrieValue> {
        self.value.as_ref()
    }

    /// The child reached by `byte`, if present
    pub fn child(&self, byte: u8) -> Option<&TrieNode> {
        self.children.get(&byte).map(Arc::as_ref)
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl fmt::Debug for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieNode")
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .field("is_terminal", &self.is_terminal)
            .finish()
    }
}
