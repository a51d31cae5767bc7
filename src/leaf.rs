//! Circular doubly linked list of leaves in ascending key order.
//!
//! Leaves are stored in a [`Slab`], so a leaf's index stays stable for as
//! long as the leaf is present. Links between leaves, and every jump pointer
//! in the level tables, are plain [`LeafId`]s into this slab; the list is the
//! single owner of leaf storage and dropping a leaf means removing it here.

use slab::Slab;

/// Stable handle of a leaf inside the [`LeafList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LeafId(usize);

#[derive(Clone, Debug)]
pub(crate) struct Leaf<K, V> {
    pub key: K,
    pub value: V,
    /// Wraps to the last leaf when this is the head.
    prev: LeafId,
    /// Wraps to the head when this is the last leaf.
    next: LeafId,
}

#[derive(Clone, Debug)]
pub(crate) struct LeafList<K, V> {
    leaves: Slab<Leaf<K, V>>,
    /// Smallest key. `None` iff the list is empty.
    head: Option<LeafId>,
}

impl<K, V> LeafList<K, V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            leaves: Slab::with_capacity(capacity),
            head: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[inline]
    pub fn first(&self) -> Option<LeafId> {
        self.head
    }

    #[inline]
    pub fn last(&self) -> Option<LeafId> {
        self.head.map(|head| self.leaves[head.0].prev)
    }

    #[inline]
    pub fn get(&self, id: LeafId) -> Option<&Leaf<K, V>> {
        self.leaves.get(id.0)
    }

    #[inline]
    pub fn get_mut(&mut self, id: LeafId) -> Option<&mut Leaf<K, V>> {
        self.leaves.get_mut(id.0)
    }

    /// Leaf behind a handle that the trie structure refers to.
    ///
    /// Panics if the handle is dangling, which means the level tables and the
    /// list have diverged.
    #[inline]
    pub fn leaf(&self, id: LeafId) -> &Leaf<K, V> {
        &self.leaves[id.0]
    }

    #[inline]
    pub fn leaf_mut(&mut self, id: LeafId) -> &mut Leaf<K, V> {
        &mut self.leaves[id.0]
    }

    /// Successor in key order, `None` once the list wraps.
    #[inline]
    pub fn next_of(&self, id: LeafId) -> Option<LeafId> {
        let next = self.leaves[id.0].next;
        (Some(next) != self.head).then_some(next)
    }

    /// Predecessor in key order, `None` for the head.
    #[inline]
    pub fn prev_of(&self, id: LeafId) -> Option<LeafId> {
        (Some(id) != self.head).then(|| self.leaves[id.0].prev)
    }

    /// Splice a new leaf directly after `pred`, or in front of the head when
    /// `pred` is `None`. The caller guarantees that this keeps the list
    /// sorted.
    pub fn insert_after(&mut self, pred: Option<LeafId>, key: K, value: V) -> LeafId {
        let id = LeafId(self.leaves.vacant_key());

        let (prev, next) = match (pred, self.head) {
            (_, None) => (id, id),
            (Some(pred), Some(_)) => (pred, self.leaves[pred.0].next),
            (None, Some(head)) => (self.leaves[head.0].prev, head),
        };
        let key_in_slab = self.leaves.insert(Leaf {
            key,
            value,
            prev,
            next,
        });
        debug_assert_eq!(key_in_slab, id.0);

        if self.head.is_none() {
            self.head = Some(id);
            return id;
        }
        self.leaves[prev.0].next = id;
        self.leaves[next.0].prev = id;
        if pred.is_none() {
            self.head = Some(id);
        }
        id
    }

    /// Unsplice a leaf and release its storage.
    pub fn unlink(&mut self, id: LeafId) -> Leaf<K, V> {
        let leaf = self.leaves.remove(id.0);
        if leaf.next == id {
            self.head = None;
        } else {
            self.leaves[leaf.prev.0].next = leaf.next;
            self.leaves[leaf.next.0].prev = leaf.prev;
            if self.head == Some(id) {
                self.head = Some(leaf.next);
            }
        }
        leaf
    }

    /// Leaf handles in ascending key order.
    pub fn ordered_ids(&self) -> Vec<LeafId> {
        let mut ids = Vec::with_capacity(self.len());
        let mut cur = self.head;
        while let Some(id) = cur {
            ids.push(id);
            cur = self.next_of(id);
        }
        ids
    }

    /// Mutable access to every value, in ascending key order.
    pub fn ordered_mut(&mut self) -> Vec<(K, &mut V)>
    where
        K: Copy + Ord,
    {
        let mut entries: Vec<(K, &mut V)> = self
            .leaves
            .iter_mut()
            .map(|(_, leaf)| (leaf.key, &mut leaf.value))
            .collect();
        entries.sort_unstable_by_key(|&(key, _)| key);
        entries
    }

    /// Consume the list, yielding entries in ascending key order.
    pub fn into_sorted(mut self) -> Vec<(K, V)> {
        let order = self.ordered_ids();
        order
            .into_iter()
            .map(|id| {
                let leaf = self.leaves.remove(id.0);
                (leaf.key, leaf.value)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.leaves.clear();
        self.head = None;
    }
}
