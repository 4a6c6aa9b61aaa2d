//! Engine
//!
//! The bounded-cache key-value engine that coordinates the MemTable and the
//! SSTables.
//!
//! ## Responsibilities
//! - Keep the MemTable under the configured cache budget
//! - Spill the MemTable to an SSTable whenever the budget is reached
//! - Compact SSTables once there are too many
//! - Answer point reads and ordered prefix scans over both tiers
//!
//! A spill moves committed writes from memory to disk; it never drops one.
//! There is no write-ahead log: the engine's directory only lives as long
//! as its owner, so there is nothing to recover after a crash.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;

use super::manager::StorageManager;
use super::memtable::MemTable;
use super::Entry;

/// The bounded-cache storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
/// - Writes (put/delete/flush/compact) are serialized by `write_lock`
/// - Reads go to the MemTable (internal RwLock) and then the SSTables
pub struct Engine {
    /// Directory holding the SSTables
    storage_dir: PathBuf,

    /// In-memory tier, bounded by `cache_size_limit`
    memtable: MemTable,

    /// On-disk tier
    storage: StorageManager,

    /// Serializes write operations
    write_lock: Mutex<()>,

    cache_size_limit: usize,

    max_sstables: usize,
}

impl Engine {
    const SSTABLE_DIR: &'static str = "sstables";

    /// Open or create an engine rooted at `dir`
    pub fn open(dir: &Path, config: &Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(dir)?;

        let storage_dir = dir.join(Self::SSTABLE_DIR);
        let storage = StorageManager::open(&storage_dir, config.verify_checksums)?;

        Ok(Self {
            storage_dir,
            memtable: MemTable::new(),
            storage,
            write_lock: Mutex::new(()),
            cache_size_limit: config.cache_size_bytes,
            max_sstables: config.max_sstables,
        })
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. SSTables (newest to oldest)
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let entry = match self.memtable.get(key) {
            Some(entry) => Some(entry),
            None => self.storage.get(key)?,
        };
        Ok(match entry {
            Some(Entry::Value(value)) => Some(value),
            Some(Entry::Tombstone) | None => None,
        })
    }

    /// True if `key` currently has a live value
    pub fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Put a key-value pair
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        let new_size = self.memtable.put(key.to_vec(), value.to_vec());
        self.maybe_spill(new_size)
    }

    /// Delete a key (writes a tombstone)
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        let new_size = self.memtable.delete(key.to_vec());
        self.maybe_spill(new_size)
    }

    /// Live key-value pairs whose key starts with `prefix`, in
    /// lexicographic key order
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged = self.storage.scan_prefix(prefix)?;
        for (key, entry) in self.memtable.scan_prefix(prefix) {
            merged.insert(key, entry);
        }
        Ok(merged
            .into_iter()
            .filter_map(|(key, entry)| match entry {
                Entry::Value(value) => Some((key, value)),
                Entry::Tombstone => None,
            })
            .collect())
    }

    /// Live keys starting with `prefix`, in lexicographic order
    pub fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .scan_prefix(prefix)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Spill the MemTable to disk regardless of its size
    pub fn flush(&self) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.flush_internal()
    }

    /// Merge all SSTables into one
    pub fn compact(&self) -> Result<()> {
        let _write_guard = self.write_lock.lock();
        self.storage.compact()?;
        Ok(())
    }

    /// Called with the write lock held
    fn maybe_spill(&self, memtable_size: usize) -> Result<()> {
        if memtable_size < self.cache_size_limit {
            return Ok(());
        }
        tracing::debug!(
            size = memtable_size,
            limit = self.cache_size_limit,
            "memtable reached cache budget"
        );
        self.flush_internal()
    }

    /// Called with the write lock held
    fn flush_internal(&self) -> Result<()> {
        if self.memtable.is_empty() {
            return Ok(());
        }

        // Clear only after the SSTable is durable on disk.
        self.storage.flush(self.memtable.iter())?;
        self.memtable.clear();

        if self.storage.sstable_count() >= self.max_sstables {
            self.storage.compact()?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Directory where SSTables are stored
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Current MemTable size in bytes
    pub fn memtable_size(&self) -> usize {
        self.memtable.size()
    }

    pub fn memtable_entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    pub fn sstable_count(&self) -> usize {
        self.storage.sstable_count()
    }

    pub fn cache_size_limit(&self) -> usize {
        self.cache_size_limit
    }
}
