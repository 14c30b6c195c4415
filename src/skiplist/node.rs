//! Arena-allocated skiplist nodes, with atomic forward pointers so that readers can traverse the
//! forward-pointer graph while a single writer concurrently links in new nodes.
//!
//! See the module-level docs of [`crate::skiplist`] for the full memory-ordering contract.

use crate::arena::Arena;
use crate::maybe_loom::{AtomicPtr, Ordering};
use std::ptr;

/// An arena-allocated skiplist node: an immutable key, plus a forward-pointer array sized
/// exactly to the node's sampled height.
///
/// Once a node is linked in (reachable from head at some level), its `key` is never mutated, and
/// each `forward` slot is only ever overwritten by `insert`, under external writer
/// serialization. Concurrent readers only ever load these pointers, never store to them.
pub(crate) struct Node<'a, K> {
    key: K,
    forward: &'a [AtomicPtr<Node<'a, K>>],
}

impl<'a, K> Node<'a, K> {
    /// Allocate a node of the given `height` holding `key`, from `arena`.
    ///
    /// All forward slots start out null (end-of-list at every level the node has).
    pub(crate) fn new(arena: &'a Arena, key: K, height: usize) -> &'a Self {
        debug_assert!(height >= 1, "a node must have at least one forward pointer");

        let forward = arena.alloc_slice_with(height, |_| AtomicPtr::new(ptr::null_mut()));
        arena.alloc(Self { key, forward })
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.forward.len()
    }

    /// Load the forward pointer at `level`, if the node is tall enough to have one.
    ///
    /// # Panics
    /// Panics if `order` is [`Ordering::Release`] or [`Ordering::AcqRel`].
    #[inline]
    pub(crate) fn load_forward(&self, level: usize, order: Ordering) -> Option<&'a Self> {
        let slot = self.forward.get(level)?;
        let raw = slot.load(order);
        // SAFETY: every non-null value ever stored into a `forward` slot is a pointer obtained
        // from `Node::new`'s arena allocation (see `set_forward`'s safety contract), which lives
        // for `'a` since it was allocated from the same `'a Arena`.
        unsafe { raw.as_ref() }
    }

    /// Store `next` as the forward pointer at `level`.
    ///
    /// # Safety
    /// If `next` is `Some`, the referenced node must have been allocated from the same `'a
    /// Arena` as `self`.
    ///
    /// # Panics
    /// Panics if `order` is [`Ordering::Acquire`] or [`Ordering::AcqRel`]. May panic if `level >=
    /// self.height()`.
    #[inline]
    pub(crate) unsafe fn set_forward(&self, level: usize, next: Option<&'a Self>, order: Ordering) {
        debug_assert!(level < self.height(), "no forward slot at this level");

        if let Some(slot) = self.forward.get(level) {
            let raw = next.map_or(ptr::null_mut(), |n| ptr::from_ref(n).cast_mut());
            slot.store(raw, order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_node_has_null_forwards() {
        let arena = Arena::new();
        let node = Node::new(&arena, 42_u64, 3);

        assert_eq!(*node.key(), 42);
        assert_eq!(node.height(), 3);
        for level in 0..3 {
            assert!(node.load_forward(level, Ordering::Relaxed).is_none());
        }
    }

    #[test]
    fn linking_is_visible_through_the_same_arena() {
        let arena = Arena::new();
        let a = Node::new(&arena, 1_u64, 1);
        let b = Node::new(&arena, 2_u64, 1);

        // SAFETY: `b` was allocated from the same arena as `a`.
        unsafe { a.set_forward(0, Some(b), Ordering::Release) };

        let next = a.load_forward(0, Ordering::Acquire).unwrap();
        assert_eq!(*next.key(), 2);
    }

    #[test]
    fn out_of_height_level_reads_as_none() {
        let arena = Arena::new();
        let node = Node::new(&arena, 1_u64, 1);
        assert!(node.load_forward(5, Ordering::Relaxed).is_none());
    }
}
