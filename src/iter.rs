//! Ordered iteration over the leaf list.
//!
//! Iterators never touch the level tables; they only follow leaf links.

use std::iter::FusedIterator;

use crate::leaf::{LeafId, LeafList};

/// Entries of an [`XFastTrie`](crate::XFastTrie) in ascending key order.
pub struct Iter<'a, K, V> {
    leaves: &'a LeafList<K, V>,
    front: Option<LeafId>,
    back: Option<LeafId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(leaves: &'a LeafList<K, V>) -> Self {
        Self {
            leaves,
            front: leaves.first(),
            back: leaves.last(),
            remaining: leaves.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            leaves: self.leaves,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K: Copy, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let leaves = self.leaves;
        let id = self.front?;
        self.remaining -= 1;
        self.front = leaves.next_of(id);
        let leaf = leaves.leaf(id);
        Some((leaf.key, &leaf.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Copy, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let leaves = self.leaves;
        let id = self.back?;
        self.remaining -= 1;
        self.back = leaves.prev_of(id);
        let leaf = leaves.leaf(id);
        Some((leaf.key, &leaf.value))
    }
}

impl<K: Copy, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K: Copy, V> FusedIterator for Iter<'_, K, V> {}

/// Entries whose keys fall in a range, ascending.
pub struct Range<'a, K, V> {
    leaves: &'a LeafList<K, V>,
    /// Both ends are inclusive; `None` on both once exhausted.
    front: Option<LeafId>,
    back: Option<LeafId>,
}

impl<'a, K, V> Range<'a, K, V> {
    pub(crate) fn new(leaves: &'a LeafList<K, V>, span: Option<(LeafId, LeafId)>) -> Self {
        Self {
            leaves,
            front: span.map(|(front, _)| front),
            back: span.map(|(_, back)| back),
        }
    }

    fn consume(&mut self, id: LeafId) {
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else if self.front == Some(id) {
            self.front = self.leaves.next_of(id);
        } else {
            self.back = self.leaves.prev_of(id);
        }
    }
}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            leaves: self.leaves,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, K: Copy, V> Iterator for Range<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let leaves = self.leaves;
        let id = self.front?;
        self.consume(id);
        let leaf = leaves.leaf(id);
        Some((leaf.key, &leaf.value))
    }
}

impl<K: Copy, V> DoubleEndedIterator for Range<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let leaves = self.leaves;
        let id = self.back?;
        self.consume(id);
        let leaf = leaves.leaf(id);
        Some((leaf.key, &leaf.value))
    }
}

impl<K: Copy, V> FusedIterator for Range<'_, K, V> {}

/// Mutable entries in ascending key order.
pub struct IterMut<'a, K, V> {
    inner: std::vec::IntoIter<(K, &'a mut V)>,
}

impl<'a, K: Copy + Ord, V> IterMut<'a, K, V> {
    pub(crate) fn new(leaves: &'a mut LeafList<K, V>) -> Self {
        Self {
            inner: leaves.ordered_mut().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator in ascending key order.
pub struct IntoIter<K, V> {
    inner: std::vec::IntoIter<(K, V)>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(leaves: LeafList<K, V>) -> Self {
        Self {
            inner: leaves.into_sorted().into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Keys in ascending order.
pub struct Keys<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<K: Copy, V> Iterator for Keys<'_, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.0.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K: Copy, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<K> {
        self.0.next_back().map(|(key, _)| key)
    }
}

impl<K: Copy, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Values in ascending key order.
pub struct Values<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K: Copy, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.0.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K: Copy, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.0.next_back().map(|(_, value)| value)
    }
}

impl<K: Copy, V> ExactSizeIterator for Values<'_, K, V> {}

/// Mutable values in ascending key order.
pub struct ValuesMut<'a, K, V>(pub(crate) IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.0.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a mut V> {
        self.0.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
