//! The in-memory core of a log-structured key-value storage engine: a bump-allocating [`Arena`],
//! a non-owning [`ByteRange`] view, little-endian/varint [`codec`] primitives, and an
//! arena-backed, concurrently-readable [`SkipList`].

pub mod arena;
pub mod byte_range;
pub mod codec;
pub mod skiplist;

mod maybe_loom;
mod node_heights;

pub use self::arena::Arena;
pub use self::byte_range::ByteRange;
pub use self::skiplist::{Comparator, OrdComparator, SkipList};
