//! Module `interner` implements the append-only bijection between
//! external build targets and the dense integer
//! [handles][crate::core::TargetHandle] used everywhere else in this
//! crate.
//!
//! An interner is safe under concurrent callers without the caller
//! holding any external lock: [Interner::intern] and [Interner::lookup]
//! each take their own internal lock for the duration of the call only.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::TargetHandle;

struct Inner<T> {
    by_target: HashMap<T, TargetHandle>,
    by_handle: Vec<T>,
}

/// Bidirectional, append-only mapping `external_target <-> handle`.
///
/// Handles are assigned in insertion order and form a contiguous range
/// `[0, N)`; they are never freed or reused, consistent with the data
/// model's note that build-graph target sets grow only slowly relative
/// to history length.
pub struct Interner<T> {
    inner: RwLock<Inner<T>>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Interner::new()
    }
}

impl<T> Interner<T>
where
    T: Clone + Eq + std::hash::Hash,
{
    pub fn new() -> Self {
        Interner {
            inner: RwLock::new(Inner {
                by_target: HashMap::new(),
                by_handle: Vec::new(),
            }),
        }
    }

    /// Return the handle for `target`, minting a new one if this is the
    /// first time `target` has been seen. Concurrent calls that race on
    /// the same never-before-seen `target` are guaranteed to resolve to
    /// a single handle: the fast, lock-free-looking path below is in
    /// fact read-lock-then-write-lock, which is sufficient for
    /// correctness (the write lock serializes all inserts) even though
    /// it isn't lock-free.
    pub fn intern(&self, target: &T) -> TargetHandle {
        if let Some(handle) = self.inner.read().by_target.get(target) {
            return *handle;
        }
        let mut inner = self.inner.write();
        // Re-check: another writer may have interned `target` between
        // our read-lock release and this write-lock acquisition.
        if let Some(handle) = inner.by_target.get(target) {
            return *handle;
        }
        let handle = inner.by_handle.len() as TargetHandle;
        inner.by_handle.push(target.clone());
        inner.by_target.insert(target.clone(), handle);
        handle
    }

    /// Resolve a handle back to the external target it was minted for.
    /// `None` iff `handle` was never produced by this interner instance
    /// (handles from a different interner, or out of range).
    pub fn lookup(&self, handle: TargetHandle) -> Option<T> {
        self.inner.read().by_handle.get(handle as usize).cloned()
    }

    /// Look up `target`'s handle without minting one if it is unseen.
    /// Used by read-only query paths, so that merely *asking about* a
    /// target that has never appeared in any commit does not grow the
    /// interner.
    pub fn get(&self, target: &T) -> Option<TargetHandle> {
        self.inner.read().by_target.get(target).copied()
    }

    /// Number of distinct targets interned so far.
    pub fn len(&self) -> usize {
        self.inner.read().by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "interner_test.rs"]
mod interner_test;
