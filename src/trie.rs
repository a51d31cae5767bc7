//! X-fast trie engine and the ordered map API built on it.

use std::fmt;
use std::ops::{Bound, Index, RangeBounds};

use tracing::{debug, trace};

use crate::config::TrieConfig;
use crate::error::{Error, Result};
use crate::iter::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut};
use crate::key::TrieKey;
use crate::leaf::{LeafId, LeafList};
use crate::level::{Levels, Slot};

/// Cursor to an entry of an [`XFastTrie`], or the end marker.
///
/// Positions stay valid across insertions and across removal of other
/// entries. Removing the entry a position points at invalidates that
/// position; using it afterwards may panic or resolve to an unrelated entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position(pub(crate) Option<LeafId>);

impl Position {
    /// Past-the-end marker, shared by forward and reverse traversal.
    pub const END: Position = Position(None);

    #[inline]
    pub fn is_end(self) -> bool {
        self.0.is_none()
    }
}

/// Where a key falls among the present keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Locate {
    Exact(LeafId),
    Between {
        pred: Option<LeafId>,
        succ: Option<LeafId>,
    },
}

#[cold]
#[inline(never)]
fn invariant_violation(level: u32) -> ! {
    panic!("x-fast trie invariant violated: no ancestor node at level {level}")
}

/// An ordered map over fixed-width unsigned integer keys.
///
/// Keeps one hash table per key bit, mapping every prefix of a present key to
/// an internal node, and a sorted circular list of leaves. Lookups of the
/// deepest existing prefix binary-search the levels, so exact lookups cost a
/// single probe, neighbor queries O(log W) probes, and updates O(W).
///
/// Keys must fit in the configured width (see [`TrieConfig`]). Inserting an
/// existing key leaves the stored value untouched.
///
/// ```rust
/// use xfast_trie::XFastTrie;
///
/// let mut trie: XFastTrie<u32, &str> = XFastTrie::new();
/// trie.insert(7, "seven").unwrap();
/// trie.insert(3, "three").unwrap();
///
/// assert_eq!(trie.get(7), Some(&"seven"));
/// assert_eq!(trie.successor(3).map(|(k, _)| k), Some(7));
/// assert_eq!(trie.keys().collect::<Vec<_>>(), vec![3, 7]);
/// ```
#[derive(Clone)]
pub struct XFastTrie<K, V> {
    pub(crate) levels: Levels<K>,
    pub(crate) leaves: LeafList<K, V>,
    /// Bumped by every structural change.
    version: u64,
}

impl<K: TrieKey, V> XFastTrie<K, V> {
    /// Empty trie over the full native width of `K`.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(TrieConfig::for_key::<K>().capacity(capacity))
    }

    /// Empty trie accepting keys below `2^width`.
    pub fn with_width(width: u32) -> Result<Self> {
        Self::with_config(TrieConfig::new(width))
    }

    pub fn with_config(config: TrieConfig) -> Result<Self> {
        config.validate::<K>()?;
        if config.width != K::BITS {
            debug!(width = config.width, native = K::BITS, "narrow key space");
        }
        Ok(Self::from_config(config))
    }

    fn from_config(config: TrieConfig) -> Self {
        Self {
            levels: Levels::new(config.width),
            leaves: LeafList::with_capacity(config.capacity),
            version: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaves.len() == 0
    }

    /// Number of significant key bits.
    #[inline]
    pub fn width(&self) -> u32 {
        self.levels.width()
    }

    /// Number of distinct keys the configured width can represent,
    /// saturating at `usize::MAX`.
    pub fn max_size(&self) -> usize {
        1u128
            .checked_shl(self.width())
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX)
    }

    /// Structural modification counter.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    fn check_key(&self, key: K) -> Result<()> {
        if key.fits(self.width()) {
            Ok(())
        } else {
            Err(Error::KeyOutOfRange {
                key: key.to_u128(),
                width: self.width(),
            })
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Leaf holding `key`, via the finest level table alone.
    fn find_leaf(&self, key: K) -> Option<LeafId> {
        if !key.fits(self.width()) {
            return None;
        }
        let finest = self.levels.finest();
        let node = self.levels.get(finest, key)?;
        match node.slot(self.levels.branch(key, finest)) {
            Slot::Leaf(id) => {
                debug_assert!(self.leaves.leaf(id).key == key);
                Some(id)
            }
            _ => None,
        }
    }

    /// Resolve `key` against the deepest existing ancestor and its jump
    /// pointer. The branch `key` takes out of that ancestor is missing, so
    /// the jump bounds the subtree on that side: a right jump is the largest
    /// key below `key`, a left jump the smallest key above it.
    fn locate(&self, key: K) -> Locate {
        if !key.fits(self.width()) {
            return Locate::Between {
                pred: self.leaves.last(),
                succ: None,
            };
        }
        let Some((level, node)) = self.levels.bottom(key) else {
            return Locate::Between {
                pred: None,
                succ: None,
            };
        };
        let bit = self.levels.branch(key, level);
        match node.slot(bit) {
            Slot::Leaf(id) => Locate::Exact(id),
            Slot::Jump(id) if bit => Locate::Between {
                pred: Some(id),
                succ: self.leaves.next_of(id),
            },
            Slot::Jump(id) => Locate::Between {
                pred: self.leaves.prev_of(id),
                succ: Some(id),
            },
            Slot::Node => invariant_violation(level + 1),
        }
    }

    fn lower_bound_leaf(&self, key: K) -> Option<LeafId> {
        match self.locate(key) {
            Locate::Exact(id) => Some(id),
            Locate::Between { succ, .. } => succ,
        }
    }

    fn upper_bound_leaf(&self, key: K) -> Option<LeafId> {
        match self.locate(key) {
            Locate::Exact(id) => self.leaves.next_of(id),
            Locate::Between { succ, .. } => succ,
        }
    }

    fn floor_leaf(&self, key: K) -> Option<LeafId> {
        match self.locate(key) {
            Locate::Exact(id) => Some(id),
            Locate::Between { pred, .. } => pred,
        }
    }

    fn predecessor_leaf(&self, key: K) -> Option<LeafId> {
        match self.locate(key) {
            Locate::Exact(id) => self.leaves.prev_of(id),
            Locate::Between { pred, .. } => pred,
        }
    }

    fn entry(&self, id: Option<LeafId>) -> Option<(K, &V)> {
        let leaf = self.leaves.get(id?)?;
        Some((leaf.key, &leaf.value))
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.find_leaf(key).map(|id| &self.leaves.leaf(id).value)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let id = self.find_leaf(key)?;
        Some(&mut self.leaves.leaf_mut(id).value)
    }

    /// Like [`get`](Self::get), failing with [`Error::NotFound`].
    pub fn at(&self, key: K) -> Result<&V> {
        self.get(key).ok_or(Error::NotFound)
    }

    pub fn at_mut(&mut self, key: K) -> Result<&mut V> {
        self.get_mut(key).ok_or(Error::NotFound)
    }

    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.find_leaf(key).is_some()
    }

    /// Number of entries with this key: 0 or 1.
    #[inline]
    pub fn count(&self, key: K) -> usize {
        usize::from(self.contains_key(key))
    }

    pub fn find(&self, key: K) -> Position {
        Position(self.find_leaf(key))
    }

    /// Largest entry with a key strictly below `key`.
    pub fn predecessor(&self, key: K) -> Option<(K, &V)> {
        self.entry(self.predecessor_leaf(key))
    }

    /// Smallest entry with a key strictly above `key`.
    pub fn successor(&self, key: K) -> Option<(K, &V)> {
        self.entry(self.upper_bound_leaf(key))
    }

    /// First position whose key is not less than `key`.
    pub fn lower_bound(&self, key: K) -> Position {
        Position(self.lower_bound_leaf(key))
    }

    /// First position whose key is greater than `key`.
    pub fn upper_bound(&self, key: K) -> Position {
        Position(self.upper_bound_leaf(key))
    }

    /// `(lower_bound(key), upper_bound(key))`, spanning zero or one entry.
    pub fn equal_range(&self, key: K) -> (Position, Position) {
        match self.locate(key) {
            Locate::Exact(id) => (Position(Some(id)), Position(self.leaves.next_of(id))),
            Locate::Between { succ, .. } => (Position(succ), Position(succ)),
        }
    }

    pub fn first(&self) -> Option<(K, &V)> {
        self.entry(self.leaves.first())
    }

    pub fn last(&self) -> Option<(K, &V)> {
        self.entry(self.leaves.last())
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Insert `key` unless it is already present.
    ///
    /// Returns the position of the entry for `key` and whether it was newly
    /// inserted. An existing value is never overwritten.
    pub fn insert(&mut self, key: K, value: V) -> Result<(Position, bool)> {
        self.check_key(key)?;
        match self.locate(key) {
            Locate::Exact(id) => Ok((Position(Some(id)), false)),
            Locate::Between { pred, .. } => {
                let id = self.insert_leaf(pred, key, value);
                Ok((Position(Some(id)), true))
            }
        }
    }

    /// Insert every pair in order, keeping each pair's outcome.
    ///
    /// Stops at the first key that does not fit the width; pairs before it
    /// stay inserted.
    pub fn insert_all<I>(&mut self, pairs: I) -> Result<Vec<(Position, bool)>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(key, value)| self.insert(key, value))
            .collect()
    }

    /// Value for `key`, inserting `make()` first when absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> Result<&mut V>
    where
        F: FnOnce() -> V,
    {
        self.check_key(key)?;
        let id = match self.locate(key) {
            Locate::Exact(id) => id,
            Locate::Between { pred, .. } => self.insert_leaf(pred, key, make()),
        };
        Ok(&mut self.leaves.leaf_mut(id).value)
    }

    /// Value for `key`, inserting `V::default()` first when absent.
    pub fn entry_or_default(&mut self, key: K) -> Result<&mut V>
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    fn insert_leaf(&mut self, pred: Option<LeafId>, key: K, value: V) -> LeafId {
        let id = self.leaves.insert_after(pred, key, value);
        self.link_levels(key, id);
        self.version += 1;
        trace!(?key, len = self.len(), "insert");
        id
    }

    /// Walk the levels top-down, creating missing nodes on `key`'s path and
    /// tightening jump pointers of the sibling branches.
    fn link_levels(&mut self, key: K, leaf: LeafId) {
        let finest = self.levels.finest();
        for level in 0..=finest {
            let bit = self.levels.branch(key, level);
            let node = self.levels.get_or_insert(level, key, leaf);
            let child = if level == finest {
                Slot::Leaf(leaf)
            } else {
                Slot::Node
            };
            node.set_slot(bit, child);

            if let Slot::Jump(target) = node.slot(!bit) {
                let target_key = self.leaves.leaf(target).key;
                // Left jumps hold the subtree minimum, right jumps the maximum.
                let tighter = if bit {
                    key < target_key
                } else {
                    key > target_key
                };
                if tighter {
                    node.set_slot(!bit, Slot::Jump(leaf));
                }
            }
        }
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Remove the entry at `pos` and return the position that followed it.
    ///
    /// # Panics
    ///
    /// Panics if `pos` refers to an entry that was already removed.
    pub fn erase(&mut self, pos: Position) -> Position {
        let Some(id) = pos.0 else {
            return Position::END;
        };
        assert!(
            self.leaves.get(id).is_some(),
            "erase of a position whose entry was removed"
        );
        let (_, succ) = self.remove_leaf(id);
        Position(succ)
    }

    /// Remove the entries in `[first, last)` and return `last`.
    pub fn erase_range(&mut self, mut first: Position, last: Position) -> Position {
        while first != last && !first.is_end() {
            first = self.erase(first);
        }
        first
    }

    /// Remove `key`, returning the number of entries removed (0 or 1).
    pub fn erase_key(&mut self, key: K) -> usize {
        usize::from(self.remove(key).is_some())
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        let id = self.find_leaf(key)?;
        let (value, _) = self.remove_leaf(id);
        Some(value)
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let id = self.leaves.first()?;
        let key = self.leaves.leaf(id).key;
        let (value, _) = self.remove_leaf(id);
        Some((key, value))
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let id = self.leaves.last()?;
        let key = self.leaves.leaf(id).key;
        let (value, _) = self.remove_leaf(id);
        Some((key, value))
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(K, &mut V) -> bool,
    {
        let mut cur = self.leaves.first();
        while let Some(id) = cur {
            let leaf = self.leaves.leaf_mut(id);
            if keep(leaf.key, &mut leaf.value) {
                cur = self.leaves.next_of(id);
            } else {
                cur = self.remove_leaf(id).1;
            }
        }
    }

    /// Drop every entry and node.
    pub fn clear(&mut self) {
        let removed = self.len();
        self.leaves.clear();
        self.levels.clear();
        self.version += 1;
        debug!(removed, "clear");
    }

    /// Unsplice a leaf, repair the levels, and hand back its value together
    /// with its former successor.
    fn remove_leaf(&mut self, id: LeafId) -> (V, Option<LeafId>) {
        let pred = self.leaves.prev_of(id);
        let succ = self.leaves.next_of(id);
        let leaf = self.leaves.unlink(id);
        self.unlink_levels(leaf.key, id, pred, succ);
        self.version += 1;
        trace!(key = ?leaf.key, len = self.len(), "erase");
        (leaf.value, succ)
    }

    /// Walk the levels bottom-up. While the removed leaf is the only leaf
    /// under the current node, the node goes away. The first node with a
    /// populated sibling branch survives with a jump on the vacated side;
    /// above it only jumps that targeted the removed leaf need retargeting.
    fn unlink_levels(
        &mut self,
        key: K,
        leaf: LeafId,
        pred: Option<LeafId>,
        succ: Option<LeafId>,
    ) {
        let mut unique = true;
        for level in (0..self.levels.width()).rev() {
            let bit = self.levels.branch(key, level);
            let Some(node) = self.levels.get_mut(level, key) else {
                invariant_violation(level)
            };

            if unique {
                if !node.slot(!bit).is_real() {
                    self.levels.remove(level, key);
                    continue;
                }
                let boundary = if bit { pred } else { succ };
                let boundary = boundary.unwrap_or_else(|| invariant_violation(level));
                node.set_slot(bit, Slot::Jump(boundary));
                unique = false;
            } else if node.slot(!bit) == Slot::Jump(leaf) {
                let boundary = if bit { succ } else { pred };
                let boundary = boundary.unwrap_or_else(|| invariant_violation(level));
                node.set_slot(!bit, Slot::Jump(boundary));
            }
        }
    }

    // =========================================================================
    // Positions and iteration
    // =========================================================================

    /// Position of the smallest key, or [`Position::END`] when empty.
    pub fn begin(&self) -> Position {
        Position(self.leaves.first())
    }

    pub fn end(&self) -> Position {
        Position::END
    }

    /// Position of the largest key, or [`Position::END`] when empty.
    pub fn rbegin(&self) -> Position {
        Position(self.leaves.last())
    }

    pub fn rend(&self) -> Position {
        Position::END
    }

    /// Step forward; the last entry steps to the end marker.
    pub fn next_position(&self, pos: Position) -> Position {
        Position(pos.0.and_then(|id| self.leaves.next_of(id)))
    }

    /// Step backward; the first entry steps to the end marker and the end
    /// marker steps to the last entry.
    pub fn prev_position(&self, pos: Position) -> Position {
        match pos.0 {
            Some(id) => Position(self.leaves.prev_of(id)),
            None => self.rbegin(),
        }
    }

    pub fn entry_at(&self, pos: Position) -> Option<(K, &V)> {
        self.entry(pos.0)
    }

    pub fn key_at(&self, pos: Position) -> Option<K> {
        self.entry(pos.0).map(|(key, _)| key)
    }

    pub fn value_at_mut(&mut self, pos: Position) -> Option<&mut V> {
        self.leaves.get_mut(pos.0?).map(|leaf| &mut leaf.value)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.leaves)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.leaves)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }

    /// Entries with keys inside `range`, ascending. An inverted range is
    /// empty.
    pub fn range<R>(&self, range: R) -> Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        let front = match range.start_bound() {
            Bound::Included(&start) => self.lower_bound_leaf(start),
            Bound::Excluded(&start) => self.upper_bound_leaf(start),
            Bound::Unbounded => self.leaves.first(),
        };
        let back = match range.end_bound() {
            Bound::Included(&end) => self.floor_leaf(end),
            Bound::Excluded(&end) => self.predecessor_leaf(end),
            Bound::Unbounded => self.leaves.last(),
        };
        let span = match (front, back) {
            (Some(front), Some(back))
                if self.leaves.leaf(front).key <= self.leaves.leaf(back).key =>
            {
                Some((front, back))
            }
            _ => None,
        };
        Range::new(&self.leaves, span)
    }
}

impl<K: TrieKey, V> Default for XFastTrie<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TrieKey, V: fmt::Debug> fmt::Debug for XFastTrie<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: TrieKey, V: PartialEq> PartialEq for XFastTrie<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: TrieKey, V: Eq> Eq for XFastTrie<K, V> {}

impl<K: TrieKey, V> Index<K> for XFastTrie<K, V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not present.
    fn index(&self, key: K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key {key:?} does not exist"),
        }
    }
}

impl<K: TrieKey, V> Extend<(K, V)> for XFastTrie<K, V> {
    /// # Panics
    ///
    /// Panics if a key does not fit the trie's width.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) {
        for (key, value) in pairs {
            if let Err(err) = self.insert(key, value) {
                panic!("{err}");
            }
        }
    }
}

impl<K: TrieKey, V> FromIterator<(K, V)> for XFastTrie<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut trie = Self::new();
        trie.extend(pairs);
        trie
    }
}

impl<'a, K: TrieKey, V> IntoIterator for &'a XFastTrie<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: TrieKey, V> IntoIterator for &'a mut XFastTrie<K, V> {
    type Item = (K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: TrieKey, V> IntoIterator for XFastTrie<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.leaves)
    }
}
