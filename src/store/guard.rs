//! Value guard - pins a snapshot for the lifetime of a read

use crate::trie::Trie;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Guards a value read out of a snapshot
///
/// The guard co-owns the snapshot it was read from, so the value's owning
/// node (and the rest of that tree) stays alive while the guard is held,
/// even after later writes supersede the version it came from.
pub struct ValueGuard<T> {
    /// The snapshot the value was read from, held to keep its tree alive
    snapshot: Trie,
    /// The version the snapshot sits at in the store's history
    version: usize,
    value: Arc<T>,
}

impl<T> ValueGuard<T> {
    pub(crate) fn new(snapshot: Trie, version: usize, value: Arc<T>) -> Self {
        ValueGuard {
            snapshot,
            version,
            value,
        }
    }

    /// The version this value was read from
    pub fn version(&self) -> usize {
        self.version
    }

    /// The pinned snapshot, usable for further reads at the same version
    pub fn snapshot(&self) -> &Trie {
        &self.snapshot
    }
}

impl<T> Deref for ValueGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueGuard")
            .field("version", &self.version)
            .field("value", &*self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_derefs_to_value() {
        let trie = Trie::new().put(b"k", 5u32).unwrap();
        let guard = ValueGuard::new(trie, 1, Arc::new(5u32));
        assert_eq!(*guard, 5);
        assert_eq!(guard.version(), 1);
    }

    #[test]
    fn test_guard_snapshot_still_readable() {
        let trie = Trie::new().put(b"k", 5u32).unwrap();
        let guard = ValueGuard::new(trie, 1, Arc::new(5u32));
        assert_eq!(guard.snapshot().get::<u32>(b"k"), Some(&5));
    }
}
