//! Trie nodes with label-sorted child lists.
//!
//! Children are kept sorted so lookups binary search and walks come out in
//! label order. Most nodes have few children, so they live inline.

use label_trie::Label;
use smallvec::SmallVec;

/// A node of the store's trie.
#[derive(Clone, Debug)]
pub struct Node<L, V> {
    /// `None` only for the root.
    label: Option<L>,
    value: Option<V>,
    children: SmallVec<[Box<Node<L, V>>; 4]>,
}

impl<L: Label, V> Node<L, V> {
    pub(crate) fn root(capacity: usize) -> Self {
        Self {
            label: None,
            value: None,
            children: SmallVec::with_capacity(capacity),
        }
    }

    fn leaf(label: L) -> Self {
        Self {
            label: Some(label),
            value: None,
            children: SmallVec::new(),
        }
    }

    /// `None` for the root.
    pub fn label(&self) -> Option<&L> {
        self.label.as_ref()
    }

    /// Value stored at this node, if a key ends here.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Children in ascending label order.
    pub fn children(&self) -> impl Iterator<Item = &Node<L, V>> {
        self.children.iter().map(|c| &**c)
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    fn find_child(&self, label: &L) -> Result<usize, usize> {
        self.children
            .binary_search_by(|c| c.label.as_ref().cmp(&Some(label)))
    }

    pub(crate) fn insert(&mut self, labels: &[L], value: V) -> Option<V> {
        let mut node = self;
        for label in labels {
            let idx = match node.find_child(label) {
                Ok(idx) => idx,
                Err(idx) => {
                    node.children.insert(idx, Box::new(Node::leaf(label.clone())));
                    idx
                }
            };
            node = &mut *node.children[idx];
        }
        node.value.replace(value)
    }

    pub(crate) fn get(&self, labels: &[L]) -> Option<&V> {
        let mut node = self;
        for label in labels {
            let idx = node.find_child(label).ok()?;
            node = &*node.children[idx];
        }
        node.value.as_ref()
    }

    /// Take the value stored under `labels`, then drop every node on the
    /// path that is left with neither a value nor children.
    pub(crate) fn remove(&mut self, labels: &[L]) -> Option<V> {
        let Some((first, rest)) = labels.split_first() else {
            return self.value.take();
        };
        let idx = self.find_child(first).ok()?;
        let child = &mut self.children[idx];
        let old = child.remove(rest)?;
        if child.value.is_none() && child.children.is_empty() {
            self.children.remove(idx);
            log::trace!("pruned dead node {:?}", first);
        }
        Some(old)
    }

    pub(crate) fn clear(&mut self) {
        self.value = None;
        self.children.clear();
    }

    /// Nodes below this one.
    pub(crate) fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    pub(crate) fn collect_entries(&self, path: &mut Vec<L>, out: &mut Vec<(Vec<L>, V)>)
    where
        V: Clone,
    {
        if let Some(value) = &self.value {
            out.push((path.clone(), value.clone()));
        }
        for child in &self.children {
            if let Some(label) = &child.label {
                path.push(label.clone());
            }
            child.collect_entries(path, out);
            path.pop();
        }
    }
}
