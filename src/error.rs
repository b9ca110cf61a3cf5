//! Error types for key tokenization and trie integrity checks.

use thiserror::Error;

use crate::NodeId;

/// A key could not be turned into a label sequence.
///
/// Returned before any mutation happens, so a failed `put` leaves the trie
/// exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The input bytes are not valid UTF-8.
    #[error("invalid UTF-8 sequence at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the first malformed sequence.
        offset: usize,
    },

    /// A caller-defined key type rejected its input.
    #[error("failed to tokenize key: {0}")]
    Custom(String),
}

/// The node graph does not satisfy the trie invariants.
///
/// Cannot happen through the public mutation API; reported by
/// [`Trie::validate`](crate::Trie::validate) instead of looping forever.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// A node is reachable along more than one edge.
    #[error("node {node} is reachable more than once")]
    Cycle {
        /// The node seen twice.
        node: NodeId,
    },

    /// A sibling is on the wrong side of its parent in the level's search tree.
    #[error("sibling order violated at node {node}")]
    OrderViolation {
        /// The misplaced sibling.
        node: NodeId,
    },

    /// The recorded sibling count disagrees with the level's contents.
    #[error("node {node} records {expected} children but has {actual}")]
    SiblingCount {
        /// The owning node.
        node: NodeId,
        /// The recorded count.
        expected: usize,
        /// The number of siblings actually reachable.
        actual: usize,
    },
}
