//! Bounded, thread-safe "seen" set.
//!
//! A [`DedupGuard`] remembers identities that should not be selected again
//! (unreachable targets, targets already claimed by another agent). It is
//! shared by every agent of a raid, so it is safe to call from several host
//! worker threads at once.
//!
//! The set never grows past its bound: inserting a new identity into a full
//! set clears the whole set first. Callers must tolerate these occasional
//! full resets.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

/// Default maximum number of remembered identities.
pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// A bounded concurrent set with an overflow-clear policy.
#[derive(Debug)]
pub struct DedupGuard<K> {
    /// Name used in log lines.
    label: &'static str,
    entries: RwLock<HashSet<K>>,
    max_entries: usize,
    /// How many times the set was cleared because it was full.
    overflow_resets: AtomicU64,
}

impl<K: Eq + Hash> DedupGuard<K> {
    /// Create a guard holding at most `max_entries` identities (at least 1).
    pub fn new(label: &'static str, max_entries: usize) -> Self {
        Self {
            label,
            entries: RwLock::new(HashSet::new()),
            max_entries: max_entries.max(1),
            overflow_resets: AtomicU64::new(0),
        }
    }

    /// Remember `key`. Returns `true` if it was not already present.
    ///
    /// Adding a key that is already present is a no-op. Adding a new key to
    /// a full set clears the set before inserting.
    pub fn add(&self, key: K) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains(&key) {
            return false;
        }
        if entries.len() >= self.max_entries {
            entries.clear();
            self.overflow_resets.fetch_add(1, Ordering::Relaxed);
            debug!(guard = self.label, max = self.max_entries, "Dedup guard full, cleared");
        }
        entries.insert(key)
    }

    /// Whether `key` is remembered.
    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Forget `key`. Returns `true` if it was present.
    pub fn remove(&self, key: &K) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Forget every identity.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of remembered identities.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured bound.
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// How many overflow clears have happened.
    pub fn overflow_resets(&self) -> u64 {
        self.overflow_resets.load(Ordering::Relaxed)
    }
}
