use crate::error::{Error, Result};
use crate::key::TrieKey;
use crate::trie::XFastTrie;

/// Construction parameters for an [`XFastTrie`].
///
/// ```rust
/// use xfast_trie::{TrieConfig, XFastTrie};
///
/// let trie: XFastTrie<u32, &str> = TrieConfig::new(20).capacity(1024).build().unwrap();
/// assert_eq!(trie.width(), 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrieConfig {
    /// Number of significant key bits. Keys must be below `2^width`.
    pub width: u32,
    /// Leaves to preallocate.
    pub capacity: usize,
}

impl TrieConfig {
    pub fn new(width: u32) -> Self {
        Self { width, capacity: 0 }
    }

    /// Full native width of `K`.
    pub fn for_key<K: TrieKey>() -> Self {
        Self::new(K::BITS)
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub(crate) fn validate<K: TrieKey>(&self) -> Result<()> {
        if self.width == 0 || self.width > K::BITS {
            return Err(Error::InvalidWidth {
                width: self.width,
                max: K::BITS,
            });
        }
        Ok(())
    }

    pub fn build<K: TrieKey, V>(self) -> Result<XFastTrie<K, V>> {
        XFastTrie::with_config(self)
    }
}
