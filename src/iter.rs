//! Pull iterators over the trie.
//!
//! Nothing runs ahead of the consumer, so stopping early is just dropping
//! the iterator. Each iterator carries a visit budget equal to the arena
//! size; a well-formed trie never exhausts it, and a malformed sibling graph
//! ends iteration instead of looping.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::trie::{NodeId, NodeRef, Trie};

/// Traversal order over one level's sibling tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Order {
    /// In-order: `low` subtree, node, `high` subtree. Ascending labels.
    DepthFirst,
    /// Level by level, `low` before `high`.
    BreadthFirst,
    /// Level by level, `high` before `low`.
    BreadthFirstReverse,
}

/// Siblings of one trie level. Created by [`Trie::siblings`].
pub struct Siblings<'a, L, V> {
    trie: &'a Trie<L, V>,
    order: Order,
    /// Stack for in-order, queue for the breadth-first orders.
    pending: VecDeque<NodeId>,
    /// Next subtree to descend into (in-order only).
    cursor: Option<NodeId>,
    budget: usize,
    exhausted: bool,
}

impl<'a, L, V> Siblings<'a, L, V> {
    pub(crate) fn new(trie: &'a Trie<L, V>, first: Option<NodeId>, order: Order) -> Self {
        let mut it = Self {
            trie,
            order,
            pending: VecDeque::new(),
            cursor: None,
            budget: trie.nodes.len(),
            exhausted: false,
        };
        match order {
            Order::DepthFirst => it.cursor = first,
            Order::BreadthFirst | Order::BreadthFirstReverse => {
                it.enqueue(first);
            }
        }
        it
    }

    /// True if iteration stopped because the sibling graph revisits nodes.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn enqueue(&mut self, id: Option<NodeId>) -> bool {
        let Some(id) = id else {
            return true;
        };
        if self.budget == 0 {
            log::warn!("sibling traversal exceeded {} visits; graph is malformed", self.trie.nodes.len());
            self.exhausted = true;
            self.pending.clear();
            self.cursor = None;
            return false;
        }
        self.budget -= 1;
        self.pending.push_back(id);
        true
    }
}

impl<'a, L, V> Iterator for Siblings<'a, L, V> {
    type Item = NodeRef<'a, L, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        let nodes = &trie.nodes;
        let id = match self.order {
            Order::DepthFirst => {
                while let Some(id) = self.cursor.take() {
                    if !self.enqueue(Some(id)) {
                        return None;
                    }
                    self.cursor = nodes[id.index()].low;
                }
                let id = self.pending.pop_back()?;
                self.cursor = nodes[id.index()].high;
                id
            }
            Order::BreadthFirst => {
                let id = self.pending.pop_front()?;
                let node = &nodes[id.index()];
                let _ = self.enqueue(node.low) && self.enqueue(node.high);
                id
            }
            Order::BreadthFirstReverse => {
                let id = self.pending.pop_front()?;
                let node = &nodes[id.index()];
                let _ = self.enqueue(node.high) && self.enqueue(node.low);
                id
            }
        };
        Some(trie.node(id))
    }
}

/// Every node of a trie, root first, one whole level at a time.
/// Created by [`Trie::level_order`].
pub struct LevelOrder<'a, L, V> {
    trie: &'a Trie<L, V>,
    queue: VecDeque<NodeId>,
    budget: usize,
    exhausted: bool,
}

impl<'a, L, V> LevelOrder<'a, L, V> {
    pub(crate) fn new(trie: &'a Trie<L, V>) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(NodeId::ROOT);
        Self {
            trie,
            queue,
            budget: trie.nodes.len(),
            exhausted: false,
        }
    }

    /// True if iteration stopped because some node was reached twice.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<'a, L, V> Iterator for LevelOrder<'a, L, V> {
    type Item = NodeRef<'a, L, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        let id = self.queue.pop_front()?;
        if self.budget == 0 {
            log::warn!("level-order traversal exceeded {} visits; graph is malformed", trie.nodes.len());
            self.exhausted = true;
            self.queue.clear();
            return None;
        }
        self.budget -= 1;

        let mut children = trie.siblings(id, Order::DepthFirst);
        self.queue.extend(children.by_ref().map(|n| n.id()));
        if children.is_exhausted() {
            self.exhausted = true;
        }
        Some(trie.node(id))
    }
}

/// Stored `(labels, value)` pairs in lexicographic order. Created by
/// [`Trie::iter`].
pub struct Iter<'a, L, V> {
    trie: &'a Trie<L, V>,
    /// Nodes still to visit, with the path length above them.
    stack: Vec<(NodeId, usize)>,
    path: Vec<L>,
    root_pending: bool,
    budget: usize,
    exhausted: bool,
}

impl<'a, L, V> Iter<'a, L, V> {
    pub(crate) fn new(trie: &'a Trie<L, V>) -> Self {
        let mut it = Self {
            trie,
            stack: Vec::new(),
            path: Vec::new(),
            root_pending: true,
            budget: trie.nodes.len(),
            exhausted: false,
        };
        it.push_level(NodeId::ROOT, 0);
        it
    }

    /// True if iteration stopped because a child link loops back.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn push_level(&mut self, owner: NodeId, depth: usize) {
        let level: SmallVec<[NodeId; 16]> = self
            .trie
            .siblings(owner, Order::DepthFirst)
            .map(|n| n.id())
            .collect();
        self.stack.extend(level.into_iter().rev().map(|id| (id, depth)));
    }
}

impl<'a, L: Clone, V> Iterator for Iter<'a, L, V> {
    type Item = (Vec<L>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.trie;
        if std::mem::take(&mut self.root_pending) {
            if let Some(value) = trie.nodes[NodeId::ROOT.index()].value.as_ref() {
                return Some((Vec::new(), value));
            }
        }

        while let Some((id, depth)) = self.stack.pop() {
            if self.budget == 0 {
                log::warn!("entry traversal exceeded {} visits; graph is malformed", trie.nodes.len());
                self.exhausted = true;
                self.stack.clear();
                return None;
            }
            self.budget -= 1;
            let node = &trie.nodes[id.index()];
            self.path.truncate(depth);
            if let Some(label) = &node.label {
                self.path.push(label.clone());
            }
            self.push_level(id, depth + 1);
            if let Some(value) = node.value.as_ref() {
                return Some((self.path.clone(), value));
            }
        }
        None
    }
}
