//! Persistent trie operations

use super::node::{TrieNode, TrieValue};
use crate::{Error, Result};
use std::any::Any;
use std::sync::Arc;

/// A persistent map from byte-string keys to typed values
///
/// A `Trie` is a thin handle to an immutable tree of nodes; cloning the
/// handle is one reference-count bump. Mutating operations return a *new*
/// trie that shares every untouched subtree with the input, so any number of
/// older handles stay valid and keep answering reads with their own state.
#[derive(Clone, Debug, Default)]
pub struct Trie {
    /// Root node; `None` until the trie has been written to at least once
    root: Option<Arc<TrieNode>>,
}

impl Trie {
    /// Create an empty trie
    pub fn new() -> Self {
        Trie { root: None }
    }

    /// True when no keys are stored
    ///
    /// A trie that has been written and later fully emptied keeps its root
    /// node (the root is never pruned), so this checks content, not the
    /// presence of a root.
    pub fn is_empty(&self) -> bool {
        match &self.root {
            Some(root) => root.child_count() == 0 && !root.is_terminal(),
            None => true,
        }
    }

    /// Get a reference to the value stored under `key`
    ///
    /// Absent when the path does not exist, the final node holds no value,
    /// or the stored value is not a `T`. Never allocates; safe to run
    /// arbitrarily concurrently with other reads of the same trie.
    pub fn get<T: Any>(&self, key: &[u8]) -> Option<&T> {
        self.find(key)?.value()?.downcast_ref::<T>()
    }

    /// Get the type-erased value stored under `key`
    ///
    /// Returns a clone of the shared value handle, which stays valid
    /// independent of this trie handle's lifetime.
    pub fn lookup(&self, key: &[u8]) -> Option<TrieValue> {
        self.find(key)?.value().cloned()
    }

    /// True when `key` terminates at a value node, irrespective of the
    /// stored type
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some_and(|node| node.is_terminal())
    }

    /// Insert `value` under `key`, returning the new trie
    ///
    /// Overwrites silently replace a prior value, including one of a
    /// different type. Every node on the path from root to the key's
    /// terminal is freshly allocated; every subtree hanging off that path is
    /// shared with the input trie. Errors with [`Error::EmptyKey`] when
    /// `key` is empty.
    pub fn put<T: Any + Send + Sync>(&self, key: &[u8], value: T) -> Result<Trie> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        let root = put_at(self.root.as_deref(), key, Arc::new(value));
        Ok(Trie {
            root: Some(Arc::new(root)),
        })
    }

    /// Remove `key`, returning the new trie
    ///
    /// Nodes left with no value and no children are pruned bottom-up, except
    /// the root, which is never elided: once the trie has been written, its
    /// handle always points at a real (possibly empty) root node.
    ///
    /// Removing an absent key returns a trie with identical content, but its
    /// root is still a fresh node instance. Root identity therefore cannot
    /// detect a no-op; check [`Trie::contains_key`] first instead.
    pub fn remove(&self, key: &[u8]) -> Trie {
        let root = match self.root.as_deref() {
            Some(node) => remove_at(node, key, true),
            None => remove_at(&TrieNode::empty(), key, true),
        };
        // The root position is exempt from pruning, so `root` is always Some.
        Trie {
            root: root.map(Arc::new),
        }
    }

    /// True when both handles point at the same root node instance
    ///
    /// This is identity, not content, equality: two tries with equal
    /// contents built by separate writes compare unequal.
    pub fn ptr_eq(&self, other: &Trie) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Walk `key` from the root, one byte at a time
    fn find(&self, key: &[u8]) -> Option<&TrieNode> {
        let mut node = self.root.as_deref()?;
        for &byte in key {
            node = node.child(byte)?;
        }
        Some(node)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<&Arc<TrieNode>> {
        self.root.as_ref()
    }
}

/// Rebuild the path to `key`, installing `value` at its end
///
/// `node` is the existing node at this position, if any. Every node this
/// returns is freshly allocated; children off the key's path are carried
/// over by reference from `node`.
fn put_at(node: Option<&TrieNode>, key: &[u8], value: TrieValue) -> TrieNode {
    match key.split_first() {
        None => {
            // Terminal position: new value node, existing children preserved.
            let children = node.map(|n| n.children.clone()).unwrap_or_default();
            TrieNode::with_value(children, value)
        }
        Some((&byte, rest)) => {
            let mut new_node = node.map(|n| n.clone()).unwrap_or_default();
            let existing = new_node.children.get(&byte).cloned();
            let child = put_at(existing.as_deref(), rest, value);
            new_node.children.insert(byte, Arc::new(child));
            new_node
        }
    }
}

/// Rebuild the path to `key` with the key's value stripped, pruning nodes
/// that end up with no value and no children
///
/// Returns `None` when this subtree is now empty and should be elided from
/// its parent. The root (`at_root`) never signals deletion.
fn remove_at(node: &TrieNode, key: &[u8], at_root: bool) -> Option<TrieNode> {
    let Some((&byte, rest)) = key.split_first() else {
        // Terminal position for the key.
        if !node.is_terminal() {
            // Nothing stored here; the clone still replaces the original,
            // because the parent already committed to rebuilding this path.
            return Some(node.clone());
        }
        let demoted = node.without_value();
        if !at_root && demoted.child_count() == 0 {
            return None;
        }
        return Some(demoted);
    };

    let mut new_node = node.clone();
    let Some(child) = node.child(byte) else {
        // Key not present below this point.
        return Some(new_node);
    };
    match remove_at(child, rest, false) {
        Some(new_child) => {
            new_node.children.insert(byte, Arc::new(new_child));
        }
        None => {
            new_node.children.remove(&byte);
        }
    }
    if !at_root && new_node.child_count() == 0 && !new_node.is_terminal() {
        return None;
    }
    Some(new_node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_trie_get() {
        let trie = Trie::new();
        assert_eq!(trie.get::<u32>(b"anything"), None);
        assert!(trie.is_empty());
    }

    #[test]
    fn test_put_get_roundtrip() {
        let trie = Trie::new().put(b"key", 42u32).unwrap();
        assert_eq!(trie.get::<u32>(b"key"), Some(&42));
        assert!(!trie.is_empty());
    }

    #[test]
    fn test_get_missing_key() {
        let trie = Trie::new().put(b"key", 1u32).unwrap();
        assert_eq!(trie.get::<u32>(b"other"), None);
        assert_eq!(trie.get::<u32>(b"ke"), None);
        assert_eq!(trie.get::<u32>(b"keys"), None);
    }

    #[test]
    fn test_get_type_mismatch_is_absent() {
        let trie = Trie::new().put(b"key", 42u32).unwrap();
        assert_eq!(trie.get::<String>(b"key"), None);
        assert_eq!(trie.get::<u32>(b"key"), Some(&42));
    }

    #[test]
    fn test_interior_node_is_not_a_value() {
        let trie = Trie::new().put(b"apple", 1u32).unwrap();
        // "app" lies on the path but terminates no key.
        assert_eq!(trie.get::<u32>(b"app"), None);
        assert!(!trie.contains_key(b"app"));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let trie = Trie::new()
            .put(b"key", 1u32)
            .unwrap()
            .put(b"key", 2u32)
            .unwrap();
        assert_eq!(trie.get::<u32>(b"key"), Some(&2));
    }

    #[test]
    fn test_overwrite_with_different_type() {
        let trie = Trie::new()
            .put(b"key", 1u32)
            .unwrap()
            .put(b"key", String::from("two"))
            .unwrap();
        assert_eq!(trie.get::<u32>(b"key"), None);
        assert_eq!(trie.get::<String>(b"key"), Some(&String::from("two")));
    }

    #[test]
    fn test_put_empty_key_rejected() {
        let trie = Trie::new();
        assert!(matches!(trie.put(b"", 1u32), Err(Error::EmptyKey)));
    }

    #[test]
    fn test_prefix_and_extension_coexist() {
        let trie = Trie::new()
            .put(b"app", 1u32)
            .unwrap()
            .put(b"apple", 2u32)
            .unwrap();
        assert_eq!(trie.get::<u32>(b"app"), Some(&1));
        assert_eq!(trie.get::<u32>(b"apple"), Some(&2));
    }

    #[test]
    fn test_put_leaves_input_untouched() {
        let t1 = Trie::new().put(b"a", 1u32).unwrap();
        let t2 = t1.put(b"b", 2u32).unwrap();

        assert_eq!(t1.get::<u32>(b"a"), Some(&1));
        assert_eq!(t1.get::<u32>(b"b"), None);
        assert_eq!(t2.get::<u32>(b"a"), Some(&1));
        assert_eq!(t2.get::<u32>(b"b"), Some(&2));
    }

    #[test]
    fn test_structural_sharing_off_path() {
        let t1 = Trie::new()
            .put(b"ab", 1u32)
            .unwrap()
            .put(b"cd", 2u32)
            .unwrap();
        let t2 = t1.put(b"ax", 3u32).unwrap();

        let r1 = t1.root().unwrap();
        let r2 = t2.root().unwrap();
        // The write touched the 'a' subtree; the 'c' subtree is the same
        // node instance in both trees.
        assert!(!Arc::ptr_eq(r1, r2));
        assert!(Arc::ptr_eq(
            r1.children.get(&b'c').unwrap(),
            r2.children.get(&b'c').unwrap()
        ));
        assert!(!Arc::ptr_eq(
            r1.children.get(&b'a').unwrap(),
            r2.children.get(&b'a').unwrap()
        ));
    }

    #[test]
    fn test_value_shared_between_versions() {
        let t1 = Trie::new().put(b"big", vec![0u8; 1024]).unwrap();
        let t2 = t1.put(b"other", 1u32).unwrap();

        // The overwritten tree shares the untouched value allocation.
        let v1 = t1.lookup(b"big").unwrap();
        let v2 = t2.lookup(b"big").unwrap();
        assert!(Arc::ptr_eq(&v1, &v2));
    }

    #[test]
    fn test_remove_then_get_absent() {
        let trie = Trie::new().put(b"key", 7u32).unwrap().remove(b"key");
        assert_eq!(trie.get::<u32>(b"key"), None);
        assert!(!trie.contains_key(b"key"));
    }

    #[test]
    fn test_remove_prefix_keeps_extension() {
        let trie = Trie::new()
            .put(b"app", 1u32)
            .unwrap()
            .put(b"apple", 2u32)
            .unwrap()
            .remove(b"app");
        assert_eq!(trie.get::<u32>(b"app"), None);
        assert_eq!(trie.get::<u32>(b"apple"), Some(&2));
    }

    #[test]
    fn test_remove_extension_keeps_prefix() {
        let trie = Trie::new()
            .put(b"app", 1u32)
            .unwrap()
            .put(b"apple", 2u32)
            .unwrap()
            .remove(b"apple");
        assert_eq!(trie.get::<u32>(b"app"), Some(&1));
        assert_eq!(trie.get::<u32>(b"apple"), None);
    }

    #[test]
    fn test_remove_keeps_siblings() {
        let trie = Trie::new()
            .put(b"cat", 1u32)
            .unwrap()
            .put(b"car", 2u32)
            .unwrap()
            .remove(b"cat");
        assert_eq!(trie.get::<u32>(b"cat"), None);
        assert_eq!(trie.get::<u32>(b"car"), Some(&2));
    }

    #[test]
    fn test_remove_prunes_dead_path() {
        let trie = Trie::new().put(b"abc", 1u32).unwrap().remove(b"abc");
        // The whole a→b→c chain is dead and pruned; only the root survives.
        let root = trie.root().unwrap();
        assert_eq!(root.child_count(), 0);
        assert!(trie.is_empty());
    }

    #[test]
    fn test_remove_stops_pruning_at_value_node() {
        let trie = Trie::new()
            .put(b"ab", 1u32)
            .unwrap()
            .put(b"abcd", 2u32)
            .unwrap()
            .remove(b"abcd");
        // Pruning eats the dead c→d tail but stops at the "ab" value node.
        assert_eq!(trie.get::<u32>(b"ab"), Some(&1));
        let node = trie.root().unwrap().child(b'a').unwrap().child(b'b').unwrap();
        assert_eq!(node.child_count(), 0);
    }

    #[test]
    fn test_remove_missing_key_is_content_noop() {
        let t1 = Trie::new().put(b"key", 1u32).unwrap();
        let t2 = t1.remove(b"nope");
        assert_eq!(t2.get::<u32>(b"key"), Some(&1));
        // Remove clones the root even when nothing changed: the handles are
        // content-equal but not identity-equal.
        assert!(!t1.ptr_eq(&t2));
    }

    #[test]
    fn test_remove_leaves_input_untouched() {
        let t1 = Trie::new().put(b"key", 1u32).unwrap();
        let t2 = t1.remove(b"key");
        assert_eq!(t1.get::<u32>(b"key"), Some(&1));
        assert_eq!(t2.get::<u32>(b"key"), None);
    }

    #[test]
    fn test_root_never_elided() {
        let trie = Trie::new().put(b"k", 1u32).unwrap().remove(b"k");
        assert!(trie.root().is_some());
        assert!(trie.is_empty());
    }

    #[test]
    fn test_remove_on_empty_trie_yields_real_root() {
        let trie = Trie::new().remove(b"key");
        assert!(trie.root().is_some());
        assert!(trie.is_empty());
        assert_eq!(trie.get::<u32>(b"key"), None);
    }

    #[test]
    fn test_ptr_eq() {
        let t1 = Trie::new().put(b"k", 1u32).unwrap();
        let t2 = t1.clone();
        let t3 = t1.put(b"k", 1u32).unwrap();

        assert!(t1.ptr_eq(&t2));
        assert!(!t1.ptr_eq(&t3));
        assert!(Trie::new().ptr_eq(&Trie::new()));
    }
}
