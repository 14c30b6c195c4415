//! A concurrently-readable skiplist: arbitrarily many threads may search or iterate while at
//! most one thread inserts, with no lock on the read path.
//!
//! # Memory ordering
//! Every node, once linked into the structure, is immutable except for its own forward
//! pointers, and each forward pointer is only ever written once per level (a node is linked at
//! a level exactly once; it is never unlinked). That lets the write side use a single
//! release-store per level as its publication point:
//!
//! - A search (`find_ge`, `find_lt`, `find_last`, and hence `contains`, `iter`, and the
//!   [`Iter`] cursor) acquire-loads every forward pointer it follows. Pairing with the writer's
//!   release store below means that once a search observes a node, it also observes that node's
//!   own forward pointers and key as they stood at the moment of linking.
//! - `insert` relaxed-stores a new node's own forward pointers before it is reachable by anyone
//!   (no reader can have a reference to it yet, so there's nothing to order against), then
//!   release-stores the predecessor's forward pointer to publish the node at that level. Height
//!   growth (`Hcur`) is itself a relaxed store: a reader that observes a stale, lower height
//!   simply doesn't probe the new top levels yet, which is a valid (if momentarily shorter)
//!   view of the same list.
//!
//! Exactly one `insert` may be in flight at a time; the caller is responsible for that
//! serialization (typically a mutex around the mutating half of whatever owns the list), not
//! this module.

mod comparator;
mod list_inner;
mod node;

pub use comparator::{Comparator, OrdComparator};

use crate::arena::Arena;
use crate::maybe_loom::Ordering;
use list_inner::{ListInner, Pred};
use node::Node;

/// Seed used by [`SkipList::new`] when no explicit seed is given, matching the default LevelDB
/// itself uses for its own skiplist's height sampling.
const DEFAULT_SEED: u64 = 0x_dead_beef;

/// An arena-backed skiplist over keys of type `K`, ordered by `Cmp`.
///
/// `SkipList` never removes a key once inserted, and never permits two equal keys (callers must
/// not insert a key that already compares equal to one already present; see [`Self::insert`]).
pub struct SkipList<'a, K, Cmp = OrdComparator<K>> {
    inner: ListInner<'a, K, Cmp>,
}

impl<'a, K> SkipList<'a, K, OrdComparator<K>> {
    /// A new, empty skiplist ordering keys by their own [`Ord`] implementation.
    #[must_use]
    pub fn new(arena: &'a Arena) -> Self {
        Self::with_comparator(arena, OrdComparator::new())
    }
}

impl<'a, K, Cmp> SkipList<'a, K, Cmp> {
    /// A new, empty skiplist ordering keys with `cmp`.
    #[must_use]
    pub fn with_comparator(arena: &'a Arena, cmp: Cmp) -> Self {
        Self::with_comparator_seeded(arena, cmp, DEFAULT_SEED)
    }

    /// Like [`Self::with_comparator`], but with an explicit height-sampling seed; mainly useful
    /// for reproducible tests.
    #[must_use]
    pub fn with_comparator_seeded(arena: &'a Arena, cmp: Cmp, seed: u64) -> Self {
        Self {
            inner: ListInner::new_seeded(arena, cmp, seed),
        }
    }
}

impl<'a, K, Cmp: Comparator<K>> SkipList<'a, K, Cmp> {
    /// Insert `key`.
    ///
    /// # Panics
    /// Debug builds assert that no key already in the list compares equal to `key`; this
    /// structure has no notion of updating or overwriting an existing entry.
    ///
    /// # Concurrency
    /// Must not be called concurrently with another call to `insert` on the same list. May
    /// safely run concurrently with any number of reads (`contains`, `iter`, and methods on
    /// [`Iter`]).
    pub fn insert(&self, key: K) {
        self.inner.insert(key);
    }

    /// Whether some key in the list compares equal to `key`.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    /// A cursor over the list, initially positioned before the first entry (invalid until a
    /// `seek*` call).
    #[must_use]
    pub fn iter(&self) -> Iter<'_, 'a, K, Cmp> {
        Iter {
            list: &self.inner,
            current: None,
        }
    }
}

impl<K: std::fmt::Debug, Cmp> std::fmt::Debug for SkipList<'_, K, Cmp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkipList").finish_non_exhaustive()
    }
}

/// A cursor over a [`SkipList`]'s entries in ascending key order.
///
/// A freshly-created cursor is invalid (see [`Self::valid`]) until positioned with
/// [`Self::seek`], [`Self::seek_first`], or [`Self::seek_last`]. Calling [`Self::key`],
/// [`Self::next`], or [`Self::prev`] on an invalid cursor panics.
///
/// `prev` costs `O(log N)`, not `O(1)`: nodes carry no backward pointers (see the module docs),
/// so moving backward re-searches from the head for the predecessor of the current key.
pub struct Iter<'l, 'a, K, Cmp> {
    list: &'l ListInner<'a, K, Cmp>,
    current: Option<&'a Node<'a, K>>,
}

impl<'l, 'a, K, Cmp: Comparator<K>> Iter<'l, 'a, K, Cmp> {
    /// Whether the cursor is positioned on an entry.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.current.is_some()
    }

    /// The key the cursor is positioned on.
    ///
    /// # Panics
    /// Panics if `!self.valid()`.
    #[must_use]
    pub fn key(&self) -> &'a K {
        self.current
            .expect("Iter::key called on an invalid cursor")
            .key()
    }

    /// Advance to the next entry in ascending order. Becomes invalid if this was the last entry.
    ///
    /// # Panics
    /// Panics if `!self.valid()`.
    pub fn next(&mut self) {
        let current = self
            .current
            .expect("Iter::next called on an invalid cursor");
        self.current = current.load_forward(0, Ordering::Acquire);
    }

    /// Move to the previous entry in ascending order. Becomes invalid if this was the first
    /// entry.
    ///
    /// # Panics
    /// Panics if `!self.valid()`.
    pub fn prev(&mut self) {
        let current = self
            .current
            .expect("Iter::prev called on an invalid cursor");
        self.current = match self.list.find_lt(current.key()) {
            Pred::Head => None,
            Pred::Node(node) => Some(node),
        };
    }

    /// Position on the first entry whose key is greater than or equal to `target`. Becomes
    /// invalid if no such entry exists.
    pub fn seek(&mut self, target: &K) {
        self.current = self.list.find_ge(target, None);
    }

    /// Position on the first entry, if any.
    pub fn seek_first(&mut self) {
        self.current = self.list.first();
    }

    /// Position on the last entry, if any.
    pub fn seek_last(&mut self) {
        self.current = match self.list.find_last() {
            Pred::Head => None,
            Pred::Node(node) => Some(node),
        };
    }
}
