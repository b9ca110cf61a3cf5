//! # labelkv
//!
//! A concurrent key/value store over a plain trie, keyed by any
//! [`label_trie::Key`].
//!
//! Each node keeps its children sorted by label, so lookups binary search one
//! level at a time and walks come out in label order. Removing a key prunes
//! every node on its path that ends up with neither a value nor children.
//!
//! ## Example
//!
//! ```rust
//! use labelkv::LabelKv;
//!
//! let kv = LabelKv::new();
//! kv.insert("user:1001", 42u64).unwrap();
//! kv.insert("user:1002", 43u64).unwrap();
//!
//! assert_eq!(kv.get("user:1001").unwrap(), Some(42));
//! assert_eq!(kv.remove("user:1002").unwrap(), Some(43));
//! assert_eq!(kv.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod node;
pub mod walk;

pub use node::Node;
pub use walk::{Dumper, VisitMeta, Visitor};

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

use label_trie::{Key, KeyError, Label, LabelBuf};
use parking_lot::RwLock;

/// Errors returned by [`LabelKv`].
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// The key could not be turned into labels.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The key has more labels than [`Config::max_key_len`] allows.
    #[error("key has {len} labels, limit is {max}")]
    KeyTooLong {
        /// Labels in the rejected key
        len: usize,
        /// Configured limit
        max: usize,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, KvError>;

/// Configuration for the store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial capacity hint for the root's child list
    pub initial_capacity: usize,
    /// Longest key accepted, in labels
    pub max_key_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_key_len: 4096,
        }
    }
}

/// A trie-backed key/value store safe to share between threads.
///
/// One coarse lock guards the whole trie: many readers or a single writer.
pub struct LabelKv<L, V> {
    inner: RwLock<Node<L, V>>,
    len: AtomicUsize,
    config: Config,
}

impl<L: Label, V> LabelKv<L, V> {
    /// Create a new empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new store with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: RwLock::new(Node::root(config.initial_capacity)),
            len: AtomicUsize::new(0),
            config,
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // Tokenize outside the lock so a bad key never blocks anyone.
    fn labels<K>(&self, key: &K) -> Result<LabelBuf<L>>
    where
        K: Key<Label = L> + ?Sized,
    {
        let labels = key.labels()?;
        if labels.len() > self.config.max_key_len {
            return Err(KvError::KeyTooLong {
                len: labels.len(),
                max: self.config.max_key_len,
            });
        }
        Ok(labels)
    }

    /// Insert a key-value pair into the store.
    ///
    /// Returns the previous value if the key already existed.
    pub fn insert<K>(&self, key: &K, value: V) -> Result<Option<V>>
    where
        K: Key<Label = L> + ?Sized,
    {
        let labels = self.labels(key)?;
        let mut inner = self.inner.write();
        let old = inner.insert(&labels, value);
        if old.is_none() {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        Ok(old)
    }

    /// Get a copy of the value for a key.
    pub fn get<K>(&self, key: &K) -> Result<Option<V>>
    where
        K: Key<Label = L> + ?Sized,
        V: Clone,
    {
        let labels = self.labels(key)?;
        let inner = self.inner.read();
        Ok(inner.get(&labels).cloned())
    }

    /// Check if a key exists in the store.
    pub fn contains<K>(&self, key: &K) -> Result<bool>
    where
        K: Key<Label = L> + ?Sized,
    {
        let labels = self.labels(key)?;
        let inner = self.inner.read();
        Ok(inner.get(&labels).is_some())
    }

    /// Remove a key from the store, pruning nodes left empty.
    ///
    /// Returns the value if the key existed.
    pub fn remove<K>(&self, key: &K) -> Result<Option<V>>
    where
        K: Key<Label = L> + ?Sized,
    {
        let labels = self.labels(key)?;
        let mut inner = self.inner.write();
        let old = inner.remove(&labels);
        if old.is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        Ok(old)
    }

    /// Get the number of keys in the store.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every key.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.clear();
        self.len.store(0, Ordering::Relaxed);
        log::debug!("store cleared");
    }

    /// Number of nodes below the root, valued or not.
    pub fn node_count(&self) -> usize {
        self.inner.read().descendant_count()
    }

    /// Visit every node below the root depth-first, children in label order.
    ///
    /// The read lock is held for the whole walk, so the visitor must not call
    /// back into a writing method of this store.
    pub fn walk(&self, visitor: &mut impl Visitor<L, V>) {
        let inner = self.inner.read();
        walk::walk(&*inner, visitor, 1);
    }

    /// Render the trie as indented `label: value` lines.
    pub fn dump(&self) -> String
    where
        V: Debug,
    {
        let mut dumper = Dumper::new();
        self.walk(&mut dumper);
        dumper.finish()
    }

    /// Snapshot of all entries in label order.
    pub fn entries(&self) -> Vec<(Vec<L>, V)>
    where
        V: Clone,
    {
        let inner = self.inner.read();
        let mut out = Vec::with_capacity(self.len());
        inner.collect_entries(&mut Vec::new(), &mut out);
        out
    }
}

impl<L: Label, V> Default for LabelKv<L, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label, V> Debug for LabelKv<L, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelKv")
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
