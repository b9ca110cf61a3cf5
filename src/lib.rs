//! # label-trie
//!
//! A trie keyed by sequences of arbitrary ordered labels, with an
//! Aho-Corasick automaton on top for scanning input against every stored
//! pattern in a single pass.
//!
//! Each trie level keeps its distinct labels in a ternary-search-tree style
//! sibling tree (`low`/`high` links, `child` one level down). Nodes live in
//! an arena and refer to each other by [`NodeId`], which is also how the
//! compiled automaton stores its failure links.
//!
//! ## Example
//!
//! ```rust
//! use label_trie::{compile, Trie};
//!
//! let mut trie = Trie::new();
//! trie.put("ab", 2).unwrap();
//! trie.put("bc", 4).unwrap();
//! trie.put("bab", 6).unwrap();
//! trie.put("d", 7).unwrap();
//! trie.put("abcde", 10).unwrap();
//!
//! let ac = compile(trie);
//! let found: Vec<i32> = ac.match_all("babc").unwrap().into_iter().copied().collect();
//! assert_eq!(found, vec![6, 2, 4]);
//!
//! // Streaming: one label at a time.
//! let mut m = ac.matcher();
//! let at_b: Vec<&i32> = "ab".chars().flat_map(|ch| m.advance(&ch).collect::<Vec<_>>()).collect();
//! assert_eq!(at_b, vec![&2]);
//! ```
//!
//! ## Labels
//!
//! Any `Clone + Ord + Debug` type is a [`Label`]. Strings produce `char`
//! labels, slices produce their elements, and custom types implement
//! [`Key`].

#![deny(unsafe_code)]

pub mod automaton;
pub mod error;
pub mod iter;
pub mod label;
pub mod trie;

pub use automaton::{compile, Automaton, Match, Matcher, Outputs, Scan};
pub use error::{KeyError, TrieError};
pub use iter::{Iter, LevelOrder, Order, Siblings};
pub use label::{Key, Label, LabelBuf, Utf8Bytes};
pub use trie::{NodeId, NodeRef, Trie};

#[cfg(test)]
mod proptests;
