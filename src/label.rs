//! Labels and keys: the capability the trie is generic over.
//!
//! A [`Label`] is one ordered token; a [`Key`] turns an input value into a
//! finite sequence of labels. Strings decompose into `char`s, slices into
//! their elements, and anything else can implement [`Key`] directly.

use std::fmt::Debug;

use smallvec::SmallVec;

use crate::error::KeyError;

/// Trait for types that can serve as labels in the trie.
///
/// Automatically implemented for any type satisfying the bounds (`char`,
/// `u8`, `u32`, tuples, user enums deriving `Ord`, ...).
///
/// - `Clone`: nodes store their label by value
/// - `Ord`: siblings at one level form a search tree ordered by label
/// - `Debug`: dumps and error messages
pub trait Label: Clone + Ord + Debug {}

impl<T: Clone + Ord + Debug> Label for T {}

/// Buffer holding a key's labels. Short keys stay on the stack.
pub type LabelBuf<L> = SmallVec<[L; 32]>;

/// A value that decomposes into a deterministic sequence of labels.
///
/// The whole sequence is produced up front so callers can reject a key
/// before touching the trie.
pub trait Key {
    /// The label family this key produces.
    type Label: Label;

    /// Collects this key's labels, in order.
    fn labels(&self) -> Result<LabelBuf<Self::Label>, KeyError>;
}

impl Key for str {
    type Label = char;

    fn labels(&self) -> Result<LabelBuf<char>, KeyError> {
        Ok(self.chars().collect())
    }
}

impl Key for String {
    type Label = char;

    fn labels(&self) -> Result<LabelBuf<char>, KeyError> {
        self.as_str().labels()
    }
}

impl<L: Label> Key for [L] {
    type Label = L;

    fn labels(&self) -> Result<LabelBuf<L>, KeyError> {
        Ok(self.iter().cloned().collect())
    }
}

impl<L: Label, const N: usize> Key for [L; N] {
    type Label = L;

    fn labels(&self) -> Result<LabelBuf<L>, KeyError> {
        self.as_slice().labels()
    }
}

impl<L: Label> Key for Vec<L> {
    type Label = L;

    fn labels(&self) -> Result<LabelBuf<L>, KeyError> {
        self.as_slice().labels()
    }
}

impl<K: Key + ?Sized> Key for &K {
    type Label = K::Label;

    fn labels(&self) -> Result<LabelBuf<K::Label>, KeyError> {
        (**self).labels()
    }
}

/// Raw bytes decoded as UTF-8, one `char` label per code point.
///
/// Unlike `&[u8]` (which labels every byte), this key fails on malformed
/// input instead of producing a partial sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Bytes<'a>(pub &'a [u8]);

impl Key for Utf8Bytes<'_> {
    type Label = char;

    fn labels(&self) -> Result<LabelBuf<char>, KeyError> {
        match std::str::from_utf8(self.0) {
            Ok(s) => s.labels(),
            Err(e) => Err(KeyError::InvalidUtf8 {
                offset: e.valid_up_to(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_labels_are_code_points() {
        let labels = "日本語".labels().unwrap();
        assert_eq!(labels.as_slice(), &['日', '本', '語']);
    }

    #[test]
    fn test_slice_labels_are_elements() {
        let labels = [3u32, 1, 2].labels().unwrap();
        assert_eq!(labels.as_slice(), &[3, 1, 2]);
        assert_eq!(b"ab".labels().unwrap().as_slice(), b"ab");
    }

    #[test]
    fn test_utf8_bytes() {
        let ok = Utf8Bytes("héllo".as_bytes()).labels().unwrap();
        assert_eq!(ok.iter().collect::<String>(), "héllo");

        let err = Utf8Bytes(&[b'a', b'b', 0xff, b'c']).labels().unwrap_err();
        assert_eq!(err, KeyError::InvalidUtf8 { offset: 2 });
    }

    #[test]
    fn test_labels_are_repeatable() {
        let key = String::from("bacbac");
        assert_eq!(key.labels().unwrap(), key.labels().unwrap());
    }
}
