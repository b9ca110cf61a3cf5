//! Arena trie whose levels are ternary-search-tree sibling sets.
//!
//! Every node owns the root of the search tree holding its children
//! (`child`), and links to its own siblings through `low`/`high`. All links
//! are `NodeId` indices into one `Vec`, so failure links added later by the
//! compiler can point anywhere without ownership cycles.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{KeyError, TrieError};
use crate::iter::{Iter, LevelOrder, Order, Siblings};
use crate::label::{Key, Label};

// =============================================================================
// Node identity
// =============================================================================

/// Stable index of a node inside its [`Trie`].
///
/// Ids are never reused or invalidated: nodes are only ever appended.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// The synthetic root. It has no label and is the parent of level one.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    /// Id for the arena slot at `index`. Panics once ids run out.
    fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(raw) => NodeId(raw),
            Err(_) => panic!("trie arena is full: no node id for slot {index}"),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Node storage
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct Node<L, V> {
    /// `None` only for the root.
    pub(crate) label: Option<L>,
    pub(crate) value: Option<V>,
    /// Trie-level parent: the node whose child level contains this one.
    pub(crate) parent: Option<NodeId>,
    /// Siblings with smaller labels.
    pub(crate) low: Option<NodeId>,
    /// Siblings with larger labels.
    pub(crate) high: Option<NodeId>,
    /// Root of the search tree one level down.
    pub(crate) child: Option<NodeId>,
    /// Number of distinct labels in the child level.
    pub(crate) sibling_count: usize,
}

impl<L, V> Node<L, V> {
    fn new(label: Option<L>, parent: Option<NodeId>) -> Self {
        Self {
            label,
            value: None,
            parent,
            low: None,
            high: None,
            child: None,
            sibling_count: 0,
        }
    }

    /// Where `label` sits relative to this node. The root compares below
    /// every label, though it never appears inside a sibling tree.
    #[inline]
    pub(crate) fn locate(&self, label: &L) -> Ordering
    where
        L: Ord,
    {
        Some(label).cmp(&self.label.as_ref())
    }
}

// =============================================================================
// Trie
// =============================================================================

/// A trie keyed by label sequences.
///
/// ```rust
/// use label_trie::Trie;
///
/// let mut trie: Trie<char, u32> = Trie::new();
/// trie.put("foo", 1).unwrap();
/// trie.put("bar", 2).unwrap();
///
/// assert_eq!(trie.value("foo").unwrap(), Some(&1));
/// assert_eq!(trie.value("fo").unwrap(), None);
/// ```
#[derive(Clone)]
pub struct Trie<L, V> {
    pub(crate) nodes: Vec<Node<L, V>>,
    /// Number of nodes carrying a value.
    len: usize,
}

impl<L, V> Trie<L, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a trie with room for `capacity` nodes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(1));
        nodes.push(Node::new(None, None));
        Self { nodes, len: 0 }
    }

    /// Number of keys with a value.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, not counting the root.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn root(&self) -> NodeRef<'_, L, V> {
        self.node(NodeId::ROOT)
    }

    /// A read view of `id`.
    ///
    /// # Panics
    /// If `id` was not handed out by this trie.
    pub fn node(&self, id: NodeId) -> NodeRef<'_, L, V> {
        assert!(id.index() < self.nodes.len(), "node {id} out of range");
        NodeRef { trie: self, id }
    }

    /// Siblings in the child level of `node`, in the given order.
    pub fn siblings(&self, node: NodeId, order: Order) -> Siblings<'_, L, V> {
        Siblings::new(self, self.nodes[node.index()].child, order)
    }

    /// Every node, root first, each level completely before the next.
    pub fn level_order(&self) -> LevelOrder<'_, L, V> {
        LevelOrder::new(self)
    }

    /// Visit every node parent levels first; stop as soon as `visit`
    /// returns `false`.
    pub fn each_level_order(&self, mut visit: impl FnMut(NodeRef<'_, L, V>) -> bool) {
        for node in self.level_order() {
            if !visit(node) {
                break;
            }
        }
    }

    /// Stored `(labels, value)` pairs in lexicographic label order.
    pub fn iter(&self) -> Iter<'_, L, V> {
        Iter::new(self)
    }

    /// Rebuild the sibling tree under `node` into a balanced shape.
    ///
    /// Node identities are kept; only `low`/`high` links and `node.child`
    /// change. Deeper levels are left alone.
    pub fn balance(&mut self, node: NodeId) {
        if self.nodes[node.index()].child.is_none() {
            return;
        }
        let mut ordered = Vec::with_capacity(self.nodes[node.index()].sibling_count);
        ordered.extend(self.siblings(node, Order::DepthFirst).map(|n| n.id()));
        let root = self.link_balanced(&ordered, 0, ordered.len());
        self.nodes[node.index()].child = root;
        log::debug!("balanced {} siblings under node {}", ordered.len(), node);
    }

    /// Balance every level of the trie.
    pub fn balance_all(&mut self) {
        let owners: Vec<NodeId> = self
            .level_order()
            .filter(|n| n.sibling_count() > 1)
            .map(|n| n.id())
            .collect();
        for id in owners {
            self.balance(id);
        }
    }

    /// Link `ids[start..end]` (sorted by label) into a search tree and
    /// return its root. A two-node span hangs the second node off `high`.
    fn link_balanced(&mut self, ids: &[NodeId], start: usize, end: usize) -> Option<NodeId> {
        match end.saturating_sub(start) {
            0 => None,
            1 => {
                let id = ids[start];
                self.set_links(id, None, None);
                Some(id)
            }
            2 => {
                let (id, next) = (ids[start], ids[start + 1]);
                self.set_links(next, None, None);
                self.set_links(id, None, Some(next));
                Some(id)
            }
            _ => {
                let mid = (start + end) / 2;
                let low = self.link_balanced(ids, start, mid);
                let high = self.link_balanced(ids, mid + 1, end);
                self.set_links(ids[mid], low, high);
                Some(ids[mid])
            }
        }
    }

    #[inline]
    fn set_links(&mut self, id: NodeId, low: Option<NodeId>, high: Option<NodeId>) {
        let node = &mut self.nodes[id.index()];
        node.low = low;
        node.high = high;
    }

    /// Check every structural invariant: each node reachable exactly once,
    /// sibling trees ordered by label, sibling counts accurate.
    pub fn validate(&self) -> Result<(), TrieError>
    where
        L: Ord,
    {
        let mut seen = vec![false; self.nodes.len()];
        seen[NodeId::ROOT.index()] = true;
        let mut owners = vec![NodeId::ROOT];

        while let Some(owner) = owners.pop() {
            let mut actual = 0usize;
            let mut stack: Vec<(NodeId, Option<&L>, Option<&L>)> = Vec::new();
            if let Some(first) = self.nodes[owner.index()].child {
                stack.push((first, None, None));
            }

            while let Some((id, lo, hi)) = stack.pop() {
                let Some(slot) = seen.get_mut(id.index()) else {
                    return Err(TrieError::Cycle { node: id });
                };
                if std::mem::replace(slot, true) {
                    return Err(TrieError::Cycle { node: id });
                }
                actual += 1;

                let node = &self.nodes[id.index()];
                let Some(label) = node.label.as_ref() else {
                    return Err(TrieError::OrderViolation { node: id });
                };
                if lo.is_some_and(|lo| label <= lo) || hi.is_some_and(|hi| label >= hi) {
                    return Err(TrieError::OrderViolation { node: id });
                }
                if let Some(low) = node.low {
                    stack.push((low, lo, Some(label)));
                }
                if let Some(high) = node.high {
                    stack.push((high, Some(label), hi));
                }
                owners.push(id);
            }

            let expected = self.nodes[owner.index()].sibling_count;
            if actual != expected {
                return Err(TrieError::SiblingCount {
                    node: owner,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Point a sibling link somewhere it should never go.
    #[cfg(test)]
    pub(crate) fn corrupt_high(&mut self, id: NodeId, target: NodeId) {
        self.nodes[id.index()].high = Some(target);
    }

    /// Point a child link back up the trie.
    #[cfg(test)]
    pub(crate) fn corrupt_child(&mut self, id: NodeId, target: NodeId) {
        self.nodes[id.index()].child = Some(target);
    }
}

impl<L: Label, V> Trie<L, V> {
    /// Find the sibling labelled `label` in the child level of `node`.
    pub fn child(&self, node: NodeId, label: &L) -> Option<NodeId> {
        let mut cur = self.nodes[node.index()].child;
        while let Some(id) = cur {
            let n = &self.nodes[id.index()];
            cur = match n.locate(label) {
                Ordering::Equal => return Some(id),
                Ordering::Less => n.low,
                Ordering::Greater => n.high,
            };
        }
        None
    }

    /// Find the sibling labelled `label` under `node`, creating it if absent.
    ///
    /// Returns the node and whether it was created.
    pub fn dig(&mut self, node: NodeId, label: L) -> (NodeId, bool) {
        let Some(mut cur) = self.nodes[node.index()].child else {
            let id = self.alloc(label, node);
            let owner = &mut self.nodes[node.index()];
            owner.child = Some(id);
            owner.sibling_count = 1;
            return (id, true);
        };

        loop {
            let n = &self.nodes[cur.index()];
            let side = n.locate(&label);
            let next = match side {
                Ordering::Equal => return (cur, false),
                Ordering::Less => n.low,
                Ordering::Greater => n.high,
            };
            if let Some(next) = next {
                cur = next;
                continue;
            }

            let id = self.alloc(label, node);
            let at = &mut self.nodes[cur.index()];
            if side == Ordering::Less {
                at.low = Some(id);
            } else {
                at.high = Some(id);
            }
            self.nodes[node.index()].sibling_count += 1;
            return (id, true);
        }
    }

    fn alloc(&mut self, label: L, parent: NodeId) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::new(Some(label), Some(parent)));
        id
    }

    fn store<K>(&mut self, key: &K, value: V) -> Result<(NodeId, Option<V>), KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        let labels = key.labels()?;
        let mut node = NodeId::ROOT;
        for label in labels {
            node = self.dig(node, label).0;
        }
        let old = self.nodes[node.index()].value.replace(value);
        if old.is_none() {
            self.len += 1;
        }
        Ok((node, old))
    }

    /// Store `value` under `key` and return the key's terminal node.
    ///
    /// Re-inserting a key overwrites its value without changing the shape.
    pub fn put<K>(&mut self, key: &K, value: V) -> Result<NodeId, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        Ok(self.store(key, value)?.0)
    }

    /// Like [`put`](Self::put), returning the previous value instead.
    pub fn insert<K>(&mut self, key: &K, value: V) -> Result<Option<V>, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        Ok(self.store(key, value)?.1)
    }

    /// The node at the end of `key`'s path, if the whole path exists.
    ///
    /// The node may be an interior node without a value.
    pub fn get<K>(&self, key: &K) -> Result<Option<NodeRef<'_, L, V>>, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        Ok(self.find(key)?.map(|id| self.node(id)))
    }

    pub fn value<K>(&self, key: &K) -> Result<Option<&V>, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        Ok(self
            .find(key)?
            .and_then(|id| self.nodes[id.index()].value.as_ref()))
    }

    pub fn value_mut<K>(&mut self, key: &K) -> Result<Option<&mut V>, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        let found = self.find(key)?;
        Ok(found.and_then(|id| self.nodes[id.index()].value.as_mut()))
    }

    pub fn contains_key<K>(&self, key: &K) -> Result<bool, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        Ok(self.value(key)?.is_some())
    }

    fn find<K>(&self, key: &K) -> Result<Option<NodeId>, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        let labels = key.labels()?;
        let mut node = NodeId::ROOT;
        for label in &labels {
            match self.child(node, label) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    /// Labels on the path from the root to `id`.
    pub fn key_of(&self, id: NodeId) -> Vec<L> {
        let mut labels = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            let node = &self.nodes[c.index()];
            if let Some(label) = &node.label {
                labels.push(label.clone());
            }
            cur = node.parent;
        }
        labels.reverse();
        labels
    }
}

impl<L, V> Default for Trie<L, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label, V: fmt::Debug> fmt::Debug for Trie<L, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Node views
// =============================================================================

/// A borrowed view of one trie node.
pub struct NodeRef<'a, L, V> {
    trie: &'a Trie<L, V>,
    id: NodeId,
}

impl<L, V> Clone for NodeRef<'_, L, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L, V> Copy for NodeRef<'_, L, V> {}

impl<L, V> PartialEq for NodeRef<'_, L, V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.trie, other.trie)
    }
}

impl<L, V> Eq for NodeRef<'_, L, V> {}

impl<'a, L, V> NodeRef<'a, L, V> {
    #[inline]
    fn raw(&self) -> &'a Node<L, V> {
        &self.trie.nodes[self.id.index()]
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    /// `None` for the root.
    pub fn label(&self) -> Option<&'a L> {
        self.raw().label.as_ref()
    }

    pub fn value(&self) -> Option<&'a V> {
        self.raw().value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.raw().value.is_some()
    }

    /// Number of distinct labels one level down.
    pub fn sibling_count(&self) -> usize {
        self.raw().sibling_count
    }

    pub fn parent(&self) -> Option<NodeRef<'a, L, V>> {
        self.raw().parent.map(|id| self.trie.node(id))
    }

    /// Children of this node in the given order.
    pub fn iter(&self, order: Order) -> Siblings<'a, L, V> {
        self.trie.siblings(self.id, order)
    }

    /// Children in ascending label order.
    pub fn children(&self) -> Siblings<'a, L, V> {
        self.iter(Order::DepthFirst)
    }
}

impl<'a, L: Label, V> NodeRef<'a, L, V> {
    pub fn child(&self, label: &L) -> Option<NodeRef<'a, L, V>> {
        self.trie.child(self.id, label).map(|id| self.trie.node(id))
    }
}

impl<L: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, L, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.raw();
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("label", &node.label)
            .field("value", &node.value)
            .field("sibling_count", &node.sibling_count)
            .finish()
    }
}
