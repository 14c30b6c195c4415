//! Core search and insertion algorithms, independent of the public-facing iterator types in
//! [`crate::skiplist`].

use std::cell::UnsafeCell;
use std::cmp::Ordering as CmpOrdering;
use std::ptr;

use oorandom::Rand32;

use crate::arena::Arena;
use crate::maybe_loom::{AtomicPtr, AtomicUsize, Ordering};
use crate::node_heights::{random_height, MAX_HEIGHT};

use super::comparator::Comparator;
use super::node::Node;

/// A predecessor in a search: either the head sentinel, or a linked-in node.
///
/// Needed because the head's forward pointers live in a plain array on [`ListInner`] rather
/// than in an arena-allocated [`Node`] (the head has no key, so it isn't a `Node<K>` at all).
#[derive(Clone, Copy)]
pub(crate) enum Pred<'a, K> {
    Head,
    Node(&'a Node<'a, K>),
}

/// The mutable core of a skiplist: the head sentinel, the current height, the height-sampling
/// PRNG, and a borrowed arena that every node is allocated from.
///
/// # Concurrency
/// Mirrors [`crate::arena::Arena`]'s contract: every method that mutates shared state (`insert`,
/// effectively) must only be called under external writer serialization — at most one call to
/// `insert` at a time, never concurrent with another `insert`. Search methods may run
/// concurrently with at most one such writer, from any number of threads, without locking.
pub(crate) struct ListInner<'a, K, Cmp> {
    arena: &'a Arena,
    cmp: Cmp,
    head: [AtomicPtr<Node<'a, K>>; MAX_HEIGHT],
    height: AtomicUsize,
    /// Only ever touched from within `insert`, which the caller promises is externally
    /// serialized; never read by a search.
    prng: UnsafeCell<Rand32>,
}

// SAFETY: `prng` is the only field with non-atomic interior mutability, and it is only ever
// touched inside `insert`, which by this type's contract is never called concurrently with
// itself. Every other field is either atomic or immutably shared. So sharing `&ListInner` (and
// hence sending it) across threads is sound, provided `K` and `Cmp` themselves are.
unsafe impl<K: Sync, Cmp: Sync> Sync for ListInner<'_, K, Cmp> {}

impl<'a, K, Cmp> ListInner<'a, K, Cmp> {
    pub(crate) fn new_seeded(arena: &'a Arena, cmp: Cmp, seed: u64) -> Self {
        Self {
            arena,
            cmp,
            head: std::array::from_fn(|_| AtomicPtr::new(ptr::null_mut())),
            height: AtomicUsize::new(1),
            prng: UnsafeCell::new(Rand32::new(seed)),
        }
    }

    #[inline]
    fn load_height(&self) -> usize {
        self.height.load(Ordering::Relaxed)
    }

    #[inline]
    fn head_forward(&self, level: usize, order: Ordering) -> Option<&'a Node<'a, K>> {
        #[expect(clippy::indexing_slicing, reason = "level < MAX_HEIGHT is an invariant of callers")]
        let raw = self.head[level].load(order);
        // SAFETY: any non-null value stored here came from `Node::new`'s arena allocation (see
        // `insert`), living for at least `'a`.
        unsafe { raw.as_ref() }
    }

    /// # Safety
    /// If `next` is `Some`, the node must have been allocated from `self.arena`.
    #[inline]
    unsafe fn set_head_forward(&self, level: usize, next: Option<&'a Node<'a, K>>, order: Ordering) {
        #[expect(clippy::indexing_slicing, reason = "level < MAX_HEIGHT is an invariant of callers")]
        let slot = &self.head[level];
        let raw = next.map_or(ptr::null_mut(), |n| ptr::from_ref(n).cast_mut());
        slot.store(raw, order);
    }

    #[inline]
    fn pred_forward(&self, pred: Pred<'a, K>, level: usize, order: Ordering) -> Option<&'a Node<'a, K>> {
        match pred {
            Pred::Head => self.head_forward(level, order),
            Pred::Node(node) => node.load_forward(level, order),
        }
    }

    /// # Safety
    /// If `next` is `Some`, the node must have been allocated from `self.arena`.
    #[inline]
    unsafe fn set_pred_forward(
        &self,
        pred: Pred<'a, K>,
        level: usize,
        next: Option<&'a Node<'a, K>>,
        order: Ordering,
    ) {
        match pred {
            // SAFETY: forwarded from this function's own contract.
            Pred::Head => unsafe { self.set_head_forward(level, next, order) },
            // SAFETY: forwarded from this function's own contract.
            Pred::Node(node) => unsafe { node.set_forward(level, next, order) },
        }
    }
}

impl<'a, K, Cmp: Comparator<K>> ListInner<'a, K, Cmp> {
    /// Find the first node whose key is greater than or equal to `key`, optionally recording, at
    /// every level below the search's starting height, the last node visited before dropping a
    /// level (the "predecessor" at that level).
    ///
    /// `prev`, if provided, has every entry up to `Hcur` populated; entries from `Hcur` up to
    /// `MAX_HEIGHT` are left untouched by this call (callers that need them, i.e. `insert`,
    /// fill them in separately).
    pub(crate) fn find_ge(
        &self,
        key: &K,
        mut prev: Option<&mut [Pred<'a, K>; MAX_HEIGHT]>,
    ) -> Option<&'a Node<'a, K>> {
        let mut level = self.load_height() - 1;
        let mut pred = Pred::Head;

        loop {
            let next = self.pred_forward(pred, level, Ordering::Acquire);

            let advance = match next {
                Some(node) => self.cmp.compare(node.key(), key) == CmpOrdering::Less,
                None => false,
            };

            if advance {
                // SAFETY: `advance` being true implies `next` is `Some`.
                pred = Pred::Node(next.expect("advance implies next is Some"));
                continue;
            }

            if let Some(ref mut prev) = prev {
                #[expect(clippy::indexing_slicing, reason = "level < MAX_HEIGHT is an invariant")]
                {
                    prev[level] = pred;
                }
            }

            if level == 0 {
                return next;
            }
            level -= 1;
        }
    }

    /// Find the last node whose key is strictly less than `key` (possibly the head, meaning no
    /// such node exists).
    pub(crate) fn find_lt(&self, key: &K) -> Pred<'a, K> {
        let mut level = self.load_height() - 1;
        let mut pred = Pred::Head;

        loop {
            let next = self.pred_forward(pred, level, Ordering::Acquire);

            let advance = match next {
                Some(node) => self.cmp.compare(node.key(), key) == CmpOrdering::Less,
                None => false,
            };

            if advance {
                pred = Pred::Node(next.expect("advance implies next is Some"));
                continue;
            }

            if level == 0 {
                return pred;
            }
            level -= 1;
        }
    }

    /// Find the last node in the list (possibly the head, meaning the list is empty).
    pub(crate) fn find_last(&self) -> Pred<'a, K> {
        let mut level = self.load_height() - 1;
        let mut pred = Pred::Head;

        loop {
            let next = self.pred_forward(pred, level, Ordering::Acquire);

            if let Some(node) = next {
                pred = Pred::Node(node);
                continue;
            }

            if level == 0 {
                return pred;
            }
            level -= 1;
        }
    }

    /// Insert `key`, which must not already compare equal to any key in the list.
    ///
    /// # Safety (logical, not memory-unsafety)
    /// Must not be called concurrently with another call to `insert` on the same list; the
    /// caller is responsible for external serialization (see the struct docs).
    pub(crate) fn insert(&self, key: K) {
        let mut prev = [Pred::Head; MAX_HEIGHT];
        let found = self.find_ge(&key, Some(&mut prev));

        debug_assert!(
            !found.is_some_and(|node| self.cmp.compare(node.key(), &key) == CmpOrdering::Equal),
            "insert called with a key already present in the skiplist",
        );

        // SAFETY: only this function touches `prng`, and the caller promises no concurrent
        // `insert` is in flight.
        let height = random_height(unsafe { &mut *self.prng.get() });

        let current_height = self.load_height();
        if height > current_height {
            #[expect(clippy::indexing_slicing, reason = "current_height < height <= MAX_HEIGHT")]
            for slot in &mut prev[current_height..height] {
                *slot = Pred::Head;
            }
            // Safe to publish before the node exists: a reader that sees the new height and
            // probes a not-yet-linked level simply observes the head's still-null forward
            // pointer, i.e. end-of-list, which is a valid (if momentarily stale) snapshot.
            self.height.store(height, Ordering::Relaxed);
        }

        let node = Node::new(self.arena, key, height);

        #[expect(clippy::needless_range_loop, reason = "clearer than zipping with `prev`")]
        for level in 0..height {
            #[expect(clippy::indexing_slicing, reason = "level < height <= MAX_HEIGHT")]
            let pred = prev[level];

            // Relaxed: `node` is not yet reachable from any other thread, so there is no
            // concurrent reader to order against yet.
            let next = self.pred_forward(pred, level, Ordering::Relaxed);
            // SAFETY: `next`, if any, was obtained from this same arena-backed list.
            unsafe { node.set_forward(level, next, Ordering::Relaxed) };

            // Release: this is the publication point for level `level`. Any reader that
            // acquire-loads this same pointer afterwards observes `node`'s key and every one of
            // its forward pointers, including the relaxed store just above.
            // SAFETY: `node` was just allocated from `self.arena`.
            unsafe { self.set_pred_forward(pred, level, Some(node), Ordering::Release) };
        }
    }

    /// Return true iff some node's key compares equal to `key`.
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.find_ge(key, None)
            .is_some_and(|node| self.cmp.compare(node.key(), key) == CmpOrdering::Equal)
    }

    /// The node at the very start of the level-0 chain, if the list is non-empty.
    pub(crate) fn first(&self) -> Option<&'a Node<'a, K>> {
        self.head_forward(0, Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::super::comparator::OrdComparator;
    use super::*;

    fn keys_in_order<K: Copy + Ord, Cmp: Comparator<K>>(list: &ListInner<'_, K, Cmp>) -> Vec<K> {
        let mut out = Vec::new();
        let mut current = list.first();
        while let Some(node) = current {
            out.push(*node.key());
            current = node.load_forward(0, Ordering::Acquire);
        }
        out
    }

    #[test]
    fn insert_keeps_level_zero_sorted() {
        let arena = Arena::new();
        let list = ListInner::new_seeded(&arena, OrdComparator::<i32>::new(), 1);

        for k in [5, 1, 4, 2, 3] {
            list.insert(k);
        }

        assert_eq!(keys_in_order(&list), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn contains_reflects_inserted_set() {
        let arena = Arena::new();
        let list = ListInner::new_seeded(&arena, OrdComparator::<i32>::new(), 2);

        for k in [10, 20, 30] {
            list.insert(k);
        }

        assert!(list.contains(&10));
        assert!(list.contains(&20));
        assert!(!list.contains(&15));
        assert!(!list.contains(&40));
    }

    #[test]
    fn find_ge_locates_least_upper_bound() {
        let arena = Arena::new();
        let list = ListInner::new_seeded(&arena, OrdComparator::<i32>::new(), 3);

        for k in [10, 20, 30] {
            list.insert(k);
        }

        assert_eq!(*list.find_ge(&15, None).unwrap().key(), 20);
        assert_eq!(*list.find_ge(&30, None).unwrap().key(), 30);
        assert!(list.find_ge(&31, None).is_none());
    }

    #[test]
    fn find_last_and_find_lt() {
        let arena = Arena::new();
        let list = ListInner::new_seeded(&arena, OrdComparator::<i32>::new(), 4);

        for k in [10, 20, 30] {
            list.insert(k);
        }

        let last = list.find_last();
        let Pred::Node(last) = last else { panic!("list is non-empty") };
        assert_eq!(*last.key(), 30);

        let Pred::Node(pred) = list.find_lt(&30) else { panic!() };
        assert_eq!(*pred.key(), 20);

        assert!(matches!(list.find_lt(&10), Pred::Head));
    }

    #[test]
    fn empty_list_has_no_first_or_last() {
        let arena = Arena::new();
        let list = ListInner::new_seeded(&arena, OrdComparator::<i32>::new(), 5);

        assert!(list.first().is_none());
        assert!(matches!(list.find_last(), Pred::Head));
        assert!(!list.contains(&0));
    }
}
