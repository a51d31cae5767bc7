//! Per-level prefix tables and internal nodes.
//!
//! A trie of width `W` keeps `W` tables. The table for level `l` maps the top
//! `l` bits of a key (its prefix id) to the internal node owning that prefix,
//! and the node branches on the next bit, `W - 1 - l`. Level 0 therefore has
//! at most one node, the root, keyed by zero.

use hashbrown::HashMap;

use crate::key::TrieKey;
use crate::leaf::LeafId;

/// One branch of an internal node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A node exists for this branch one level down.
    Node,
    /// The leaf for this branch. Only at the finest level, where there is no
    /// level below.
    Leaf(LeafId),
    /// The branch is empty. A left jump targets the smallest leaf of the
    /// node's subtree, a right jump the largest.
    Jump(LeafId),
}

impl Slot {
    /// Whether the branch holds at least one leaf.
    #[inline]
    pub fn is_real(self) -> bool {
        !matches!(self, Slot::Jump(_))
    }
}

/// Internal node. Identified by `(level, prefix id)` through its table entry;
/// it stores nothing but its two branches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    slots: [Slot; 2],
}

impl Node {
    /// Node for a prefix whose only leaf is `leaf`.
    #[inline]
    pub fn fresh(leaf: LeafId) -> Self {
        Self {
            slots: [Slot::Jump(leaf); 2],
        }
    }

    /// Branch for the given bit (`false` = left, `true` = right).
    #[inline]
    pub fn slot(&self, bit: bool) -> Slot {
        self.slots[bit as usize]
    }

    #[inline]
    pub fn set_slot(&mut self, bit: bool, slot: Slot) {
        self.slots[bit as usize] = slot;
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Levels<K> {
    width: u32,
    tables: Vec<HashMap<K, Node>>,
}

impl<K: TrieKey> Levels<K> {
    pub fn new(width: u32) -> Self {
        debug_assert!((1..=K::BITS).contains(&width));
        Self {
            width,
            tables: (0..width).map(|_| HashMap::new()).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn finest(&self) -> u32 {
        self.width - 1
    }

    /// Prefix id of `key` at `level`.
    #[inline]
    pub fn prefix(&self, key: K, level: u32) -> K {
        key.prefix(self.width - level)
    }

    /// Bit of `key` that the node at `level` branches on.
    #[inline]
    pub fn branch(&self, key: K, level: u32) -> bool {
        key.bit(self.width - 1 - level)
    }

    #[inline]
    pub fn get(&self, level: u32, key: K) -> Option<&Node> {
        self.tables[level as usize].get(&self.prefix(key, level))
    }

    #[inline]
    pub fn get_mut(&mut self, level: u32, key: K) -> Option<&mut Node> {
        let prefix = self.prefix(key, level);
        self.tables[level as usize].get_mut(&prefix)
    }

    /// Node on `key`'s path at `level`, created as [`Node::fresh`] for `leaf`
    /// when missing.
    #[inline]
    pub fn get_or_insert(&mut self, level: u32, key: K, leaf: LeafId) -> &mut Node {
        let prefix = self.prefix(key, level);
        self.tables[level as usize]
            .entry(prefix)
            .or_insert_with(|| Node::fresh(leaf))
    }

    #[inline]
    pub fn remove(&mut self, level: u32, key: K) -> Option<Node> {
        let prefix = self.prefix(key, level);
        self.tables[level as usize].remove(&prefix)
    }

    /// Deepest existing ancestor of `key`, found by binary search over the
    /// levels. Prefixes are closed under truncation, so presence is monotone
    /// in the level and O(log W) table probes suffice.
    pub fn bottom(&self, key: K) -> Option<(u32, &Node)> {
        let mut lo = 0;
        let mut hi = self.width;
        let mut found = None;
        while lo < hi {
            let mid = (lo + hi) / 2;
            match self.get(mid, key) {
                Some(node) => {
                    found = Some((mid, node));
                    lo = mid + 1;
                }
                None => hi = mid,
            }
        }
        found
    }

    #[cfg(test)]
    pub fn table(&self, level: u32) -> &HashMap<K, Node> {
        &self.tables[level as usize]
    }

    pub fn clear(&mut self) {
        for table in &mut self.tables {
            table.clear();
        }
    }
}
