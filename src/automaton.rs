//! Aho-Corasick automaton compiled from a [`Trie`].
//!
//! Compilation annotates every node with a failure link (the node spelling
//! the longest proper suffix of its path that is also a trie path) and its
//! depth. Trie topology is never touched, so the compiled state is a plain
//! array parallel to the node arena.
//!
//! ```rust
//! use label_trie::{compile, Trie};
//!
//! let mut trie = Trie::new();
//! trie.put("he", 1).unwrap();
//! trie.put("she", 2).unwrap();
//! trie.put("hers", 3).unwrap();
//!
//! let ac = compile(trie);
//! let found: Vec<i32> = ac.match_all("ushers").unwrap().into_iter().copied().collect();
//! assert_eq!(found, vec![2, 1, 3]);
//! ```

use crate::error::KeyError;
use crate::label::{Key, Label};
use crate::trie::{NodeId, NodeRef, Trie};

/// Per-node compiled state.
#[derive(Clone, Copy, Debug)]
struct State {
    fail: NodeId,
    /// Labels on the path from the root.
    depth: u32,
}

/// A compiled multi-pattern matcher.
///
/// Immutable once built: any number of [`Matcher`]s can scan against one
/// automaton at the same time, from any number of threads.
#[derive(Clone)]
pub struct Automaton<L, V> {
    trie: Trie<L, V>,
    states: Vec<State>,
}

/// Compile `trie` into an automaton. Same as [`Automaton::compile`].
pub fn compile<L: Label, V>(trie: Trie<L, V>) -> Automaton<L, V> {
    Automaton::compile(trie)
}

impl<L: Label, V> Automaton<L, V> {
    /// Build failure links for every node of `trie`.
    ///
    /// Nodes are visited parent level first, so a node's parent already has
    /// its link when the node is reached.
    pub fn compile(trie: Trie<L, V>) -> Self {
        let mut states = vec![
            State {
                fail: NodeId::ROOT,
                depth: 0,
            };
            trie.nodes.len()
        ];
        let mut max_depth = 0;

        for node in trie.level_order() {
            let (Some(parent), Some(label)) = (node.parent(), node.label()) else {
                continue;
            };
            let parent_state = states[parent.id().index()];
            let fail = if parent.is_root() {
                NodeId::ROOT
            } else {
                goto_following_fail(&trie, &states, parent_state.fail, label)
            };
            let depth = parent_state.depth + 1;
            max_depth = max_depth.max(depth);
            states[node.id().index()] = State { fail, depth };
            log::trace!("fail({}) = {}", node.id(), fail);
        }

        log::debug!(
            "compiled automaton: {} nodes, {} patterns, max depth {}",
            trie.node_count(),
            trie.len(),
            max_depth
        );
        Self { trie, states }
    }

    /// Transition from `node` on `label`, chasing failure links on a miss.
    /// Never fails: the root absorbs every label it has no edge for.
    pub fn goto(&self, node: NodeId, label: &L) -> NodeId {
        goto_following_fail(&self.trie, &self.states, node, label)
    }

    /// A fresh cursor positioned at the root.
    pub fn matcher(&self) -> Matcher<'_, L, V> {
        Matcher {
            automaton: self,
            current: NodeId::ROOT,
            position: 0,
        }
    }

    /// Every pattern value ending at each position of `key`, in input
    /// order; at one position, longer patterns come first.
    pub fn match_all<K>(&self, key: &K) -> Result<Vec<&V>, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        let mut out = Vec::new();
        self.match_all_into(key, &mut out)?;
        Ok(out)
    }

    /// Like [`match_all`](Self::match_all), appending to `out`.
    ///
    /// Nothing is appended if `key` fails to tokenize.
    pub fn match_all_into<'a, K>(&'a self, key: &K, out: &mut Vec<&'a V>) -> Result<(), KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        let labels = key.labels()?;
        let mut matcher = self.matcher();
        for label in &labels {
            out.extend(matcher.advance(label));
        }
        Ok(())
    }

    /// Matches in `key` with their label offsets, in the order
    /// [`match_all`](Self::match_all) reports them.
    pub fn find_all<K>(&self, key: &K) -> Result<Vec<Match<&V>>, KeyError>
    where
        K: Key<Label = L> + ?Sized,
    {
        Ok(self.scan(key.labels()?).collect())
    }

    /// Lazily scan a label stream of any length.
    pub fn scan<I>(&self, labels: I) -> Scan<'_, L, V, I::IntoIter>
    where
        I: IntoIterator<Item = L>,
    {
        Scan {
            matcher: self.matcher(),
            input: labels.into_iter(),
            outputs: None,
        }
    }
}

impl<L, V> Automaton<L, V> {
    pub fn trie(&self) -> &Trie<L, V> {
        &self.trie
    }

    /// Give the trie back, e.g. to add patterns and compile again.
    pub fn into_trie(self) -> Trie<L, V> {
        self.trie
    }

    pub fn root(&self) -> NodeRef<'_, L, V> {
        self.trie.root()
    }

    /// The failure link of `node`. The root links to itself.
    pub fn fail(&self, node: NodeId) -> NodeId {
        self.states[node.index()].fail
    }

    /// Number of labels on the path to `node`.
    pub fn depth(&self, node: NodeId) -> usize {
        self.states[node.index()].depth as usize
    }

    /// Number of patterns with a value.
    pub fn pattern_count(&self) -> usize {
        self.trie.len()
    }

    /// Pattern values along the failure chain of `node`, root excluded.
    pub fn outputs(&self, node: NodeId) -> Outputs<'_, L, V> {
        Outputs {
            automaton: self,
            next: node,
        }
    }
}

impl<L: Label, V: std::fmt::Debug> std::fmt::Debug for Automaton<L, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton")
            .field("nodes", &self.trie.node_count())
            .field("patterns", &self.trie)
            .finish()
    }
}

fn goto_following_fail<L: Label, V>(
    trie: &Trie<L, V>,
    states: &[State],
    mut node: NodeId,
    label: &L,
) -> NodeId {
    loop {
        if let Some(next) = trie.child(node, label) {
            return next;
        }
        if node.is_root() {
            return NodeId::ROOT;
        }
        node = states[node.index()].fail;
    }
}

// =============================================================================
// Matching
// =============================================================================

/// A scan cursor over an [`Automaton`].
///
/// Holds nothing but its position, so cursors are cheap and independent.
pub struct Matcher<'a, L, V> {
    automaton: &'a Automaton<L, V>,
    current: NodeId,
    position: usize,
}

impl<'a, L: Label, V> Matcher<'a, L, V> {
    /// Move back to the root and forget the input consumed so far.
    pub fn reset(&mut self) -> &mut Self {
        self.current = NodeId::ROOT;
        self.position = 0;
        self
    }

    /// Consume one label and return every pattern value ending here,
    /// longest pattern first.
    ///
    /// Landing on the root is an ordinary state: it only means no pattern
    /// prefix is pending.
    pub fn advance(&mut self, label: &L) -> Outputs<'a, L, V> {
        self.current = self.automaton.goto(self.current, label);
        self.position += 1;
        self.automaton.outputs(self.current)
    }

    /// The node spelling the longest suffix of the input that is a trie path.
    pub fn state(&self) -> NodeId {
        self.current
    }

    /// Labels consumed since the last reset.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<L, V> Clone for Matcher<'_, L, V> {
    fn clone(&self) -> Self {
        Self {
            automaton: self.automaton,
            current: self.current,
            position: self.position,
        }
    }
}

/// Pattern values found at one position. Returned by [`Matcher::advance`].
pub struct Outputs<'a, L, V> {
    automaton: &'a Automaton<L, V>,
    next: NodeId,
}

impl<'a, L, V> Outputs<'a, L, V> {
    /// Next matching node and its value.
    fn next_match(&mut self) -> Option<(NodeId, &'a V)> {
        let automaton = self.automaton;
        while !self.next.is_root() {
            let id = self.next;
            self.next = automaton.fail(id);
            if let Some(value) = automaton.trie.nodes[id.index()].value.as_ref() {
                return Some((id, value));
            }
        }
        None
    }
}

impl<'a, L, V> Iterator for Outputs<'a, L, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_match().map(|(_, value)| value)
    }
}

/// One pattern occurrence: labels `start..end` of the input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Match<T> {
    pub start: usize,
    pub end: usize,
    pub value: T,
}

/// Lazy match iterator over a label stream. Created by [`Automaton::scan`].
pub struct Scan<'a, L, V, I> {
    matcher: Matcher<'a, L, V>,
    input: I,
    outputs: Option<Outputs<'a, L, V>>,
}

impl<'a, L, V, I> Iterator for Scan<'a, L, V, I>
where
    L: Label,
    I: Iterator<Item = L>,
{
    type Item = Match<&'a V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((id, value)) = self.outputs.as_mut().and_then(|o| o.next_match()) {
                let end = self.matcher.position();
                return Some(Match {
                    start: end - self.matcher.automaton.depth(id),
                    end,
                    value,
                });
            }
            let label = self.input.next()?;
            self.outputs = Some(self.matcher.advance(&label));
        }
    }
}
