//! A shim that lets the rest of the crate be written once against one set of names, while
//! `cfg(loom)` builds swap in loom's model-checked atomics instead of `std`'s.
//!
//! Nothing in this crate should `use std::sync::atomic` or `use std::sync::Arc` directly;
//! go through this module instead.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
#[cfg(loom)]
pub(crate) use loom::sync::Arc;

#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
#[cfg(not(loom))]
pub(crate) use std::sync::Arc;
