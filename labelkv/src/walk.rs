//! Depth-first walks over the store and a text dumper built on them.

use std::fmt::{Debug, Write};

use label_trie::Label;

use crate::node::Node;

/// Where a visited node sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitMeta {
    /// 1 for the first level below the root.
    pub depth: usize,
}

/// Callback for [`LabelKv::walk`](crate::LabelKv::walk).
pub trait Visitor<L, V> {
    /// Return `false` to skip this node's subtree and its remaining siblings.
    fn visit(&mut self, node: &Node<L, V>, meta: VisitMeta) -> bool;
}

impl<L, V, F> Visitor<L, V> for F
where
    F: FnMut(&Node<L, V>, VisitMeta) -> bool,
{
    fn visit(&mut self, node: &Node<L, V>, meta: VisitMeta) -> bool {
        self(node, meta)
    }
}

pub(crate) fn walk<L: Label, V>(node: &Node<L, V>, visitor: &mut impl Visitor<L, V>, depth: usize) {
    for child in node.children() {
        if !visitor.visit(child, VisitMeta { depth }) {
            break;
        }
        walk(child, &mut *visitor, depth + 1);
    }
}

/// Renders each node as `label: value`, indented two spaces per level.
#[derive(Debug, Default)]
pub struct Dumper {
    out: String,
}

impl Dumper {
    /// An empty dumper.
    pub fn new() -> Self {
        Self::default()
    }

    /// The text rendered so far.
    pub fn finish(self) -> String {
        self.out
    }
}

impl<L: Label, V: Debug> Visitor<L, V> for Dumper {
    fn visit(&mut self, node: &Node<L, V>, meta: VisitMeta) -> bool {
        for _ in 0..meta.depth {
            self.out.push_str("  ");
        }
        match (node.label(), node.value()) {
            (Some(label), Some(value)) => writeln!(self.out, "{label:?}: {value:?}").ok(),
            (Some(label), None) => writeln!(self.out, "{label:?}").ok(),
            (None, _) => writeln!(self.out, "(root)").ok(),
        };
        true
    }
}
