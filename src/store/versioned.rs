//! Thread-safe version history over persistent tries

use crate::store::ValueGuard;
use crate::trie::Trie;
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::any::Any;

/// An append-only history of trie snapshots with MVCC reads
///
/// Version 0 is always the empty trie; version `i` (i > 0) is the state
/// after the i-th committed write. Writers are serialized; readers run fully
/// in parallel with each other and with a writer's tree construction, since
/// the snapshot list is only locked exclusively for the final append.
///
/// All historical versions are retained for the lifetime of the store.
pub struct TrieStore {
    /// Serializes writers; at most one put/remove is in flight at a time,
    /// so concurrent writes apply in some sequential order
    write_lock: Mutex<()>,
    /// All historical versions; version numbers range over [0, len)
    snapshots: RwLock<Vec<Trie>>,
}

impl TrieStore {
    /// Create a store holding only the empty trie at version 0
    pub fn new() -> Self {
        TrieStore {
            write_lock: Mutex::new(()),
            snapshots: RwLock::new(vec![Trie::new()]),
        }
    }

    /// Get the value stored under `key` at `version`
    ///
    /// `None` as the version means the latest, resolved at call time.
    /// Absent on a missing key, a stored type other than `T`, or an
    /// out-of-range version. The returned guard keeps the whole snapshot
    /// alive, so the value stays readable no matter how far later writes
    /// advance the store.
    pub fn get<T: Any + Send + Sync>(
        &self,
        key: &[u8],
        version: Option<usize>,
    ) -> Option<ValueGuard<T>> {
        let (trie, version) = {
            let snapshots = self.snapshots.read();
            let version = version.unwrap_or(snapshots.len() - 1);
            (snapshots.get(version)?.clone(), version)
        };

        // The list lock is released; the cloned handle pins the snapshot.
        let value = trie.lookup(key)?.downcast::<T>().ok()?;
        Some(ValueGuard::new(trie, version, value))
    }

    /// Insert `value` under `key`, returning the new version number
    ///
    /// The new tree is built entirely outside the snapshot-list lock, so
    /// readers are only excluded for the brief final append. The new version
    /// becomes visible to readers once the append completes, never earlier.
    pub fn put<T: Any + Send + Sync>(&self, key: &[u8], value: T) -> Result<usize> {
        let _writer = self.write_lock.lock();

        let new_trie = self.latest().put(key, value)?;

        let mut snapshots = self.snapshots.write();
        snapshots.push(new_trie);
        Ok(snapshots.len() - 1)
    }

    /// Remove `key`, returning the version number after the operation
    ///
    /// If the key does not exist in the latest snapshot, no new version is
    /// created and the current version number is returned unchanged. The
    /// check is an existence probe: a remove always rebuilds the root, so
    /// comparing root identity against the previous snapshot could never
    /// detect a no-op.
    pub fn remove(&self, key: &[u8]) -> usize {
        let _writer = self.write_lock.lock();

        let latest = self.latest();
        if !latest.contains_key(key) {
            return self.current_version();
        }
        let new_trie = latest.remove(key);

        let mut snapshots = self.snapshots.write();
        snapshots.push(new_trie);
        snapshots.len() - 1
    }

    /// The index of the latest snapshot
    ///
    /// "Latest" may advance between this call and a later `get`; callers
    /// needing a stable point-in-time view should pin one via
    /// [`TrieStore::snapshot`] instead.
    pub fn current_version(&self) -> usize {
        self.snapshots.read().len() - 1
    }

    /// Hand out the trie snapshot at `version` (`None` for the latest)
    ///
    /// The returned handle is immutable and lock-free to read, so callers
    /// can run any number of `get`s against one point-in-time view without
    /// touching the store again.
    pub fn snapshot(&self, version: Option<usize>) -> Result<Trie> {
        let snapshots = self.snapshots.read();
        let version = version.unwrap_or(snapshots.len() - 1);
        snapshots
            .get(version)
            .cloned()
            .ok_or(Error::VersionOutOfRange {
                requested: version,
                latest: snapshots.len() - 1,
            })
    }

    /// The latest snapshot handle
    fn latest(&self) -> Trie {
        let snapshots = self.snapshots.read();
        snapshots
            .last()
            .cloned()
            .expect("snapshot list is never empty")
    }
}

impl Default for TrieStore {
    fn default() -> Self {
        TrieStore::new()
    }
}
