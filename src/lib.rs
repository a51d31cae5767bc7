//! # xfast-trie
//!
//! An ordered map over fixed-width unsigned integer keys, built as an
//! X-fast trie: one hash table per key bit holding every prefix of every
//! present key, plus a sorted circular list of leaves.
//!
//! - Exact lookup: one hash probe.
//! - Predecessor / successor / bounds: O(log W) probes.
//! - Insert / remove: O(W) table updates.
//! - Ordered iteration walks the leaf list only.
//!
//! ## Example
//!
//! ```rust
//! use xfast_trie::XFastTrie;
//!
//! let mut trie: XFastTrie<u64, &str> = XFastTrie::new();
//! trie.insert(42, "answer").unwrap();
//! trie.insert(7, "lucky").unwrap();
//!
//! assert_eq!(trie.get(42), Some(&"answer"));
//! assert_eq!(trie.predecessor(42), Some((7, &"lucky")));
//! assert!(trie.at(8).is_err());
//! ```

#![deny(unsafe_code)]

mod config;
mod error;
mod iter;
mod key;
mod leaf;
mod level;
mod trie;

pub use config::TrieConfig;
pub use error::{Error, Result};
pub use iter::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut};
pub use key::TrieKey;
pub use trie::{Position, XFastTrie};


#[cfg(test)]
mod proptests;
