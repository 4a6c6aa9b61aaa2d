//! MemTable
//!
//! In-memory sorted buffer for recent writes. Its byte size is the engine's
//! cache footprint: once it reaches the configured budget the engine spills
//! it to an SSTable and clears it.
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in a parking_lot RwLock:
//! - Ordered keys (required for SSTable generation and prefix scans)
//! - Many concurrent readers, one writer

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::Entry;

/// In-memory table for recent writes
pub struct MemTable {
    data: RwLock<BTreeMap<Vec<u8>, Entry>>,
    /// Approximate size in bytes (keys + values)
    size: AtomicUsize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            size: AtomicUsize::new(0),
        }
    }

    /// Get the entry for a key, tombstones included
    pub fn get(&self, key: &[u8]) -> Option<Entry> {
        self.data.read().get(key).cloned()
    }

    /// Put a key-value pair; returns the new approximate size
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> usize {
        self.insert(key, Entry::Value(value))
    }

    /// Insert a tombstone for a key; returns the new approximate size
    pub fn delete(&self, key: Vec<u8>) -> usize {
        self.insert(key, Entry::Tombstone)
    }

    fn insert(&self, key: Vec<u8>, entry: Entry) -> usize {
        let mut data = self.data.write();
        let key_len = key.len();
        let added = entry.footprint();

        // Key bytes are counted once, on first insert.
        let current = self.size.load(Ordering::Relaxed);
        let new_size = match data.insert(key, entry) {
            Some(old) => current + added - old.footprint(),
            None => current + key_len + added,
        };
        self.size.store(new_size, Ordering::Relaxed);
        new_size
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Get entry count (tombstones included)
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Snapshot of all entries in sorted key order (for flush)
    pub fn iter(&self) -> std::vec::IntoIter<(Vec<u8>, Entry)> {
        let data = self.data.read();
        data.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Entries whose key starts with `prefix`, in sorted key order
    pub fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Entry)> {
        let data = self.data.read();
        data.range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Clear all entries (after successful flush)
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.clear();
        self.size.store(0, Ordering::Relaxed);
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
