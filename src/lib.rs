//! # kalpa
//!
//! A persistent, copy-on-write prefix tree with multi-version concurrency
//! control.
//!
//! Every mutation produces a new immutable snapshot instead of altering
//! existing state, and an append-only version history lets many readers
//! observe any past snapshot concurrently with a single in-progress writer.
//!
//! ## Core Concepts
//!
//! - **Structural sharing**: a write touching a key of length L allocates
//!   O(L) new nodes and reuses every untouched subtree by reference
//! - **Snapshots**: immutable tries, one per committed write, indexed by
//!   version number and retained indefinitely
//! - **Value guards**: a read pins its owning snapshot, so the value stays
//!   valid while the guard is held, even after later writes supersede that
//!   version
//!
//! ## Example
//!
//! ```
//! use kalpa::TrieStore;
//!
//! let store = TrieStore::new();
//! let version = store.put(b"key", 42u32)?;
//! assert_eq!(version, 1);
//! assert_eq!(store.get::<u32>(b"key", None).as_deref(), Some(&42));
//! # Ok::<(), kalpa::Error>(())
//! ```

pub mod store;
pub mod trie;

mod error;

pub use error::{Error, Result};
pub use store::{TrieStore, ValueGuard};
pub use trie::{Trie, TrieNode, TrieValue};
