//! Storage Manager
//!
//! Manages the SSTables of one engine and coordinates reads, flushes, and
//! compaction.
//!
//! ## Responsibilities
//! - Discover existing SSTables on open
//! - Search SSTables newest → oldest for reads
//! - Create new SSTables from MemTable flushes
//! - Merge all SSTables into one when there are too many

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::Result;

use super::sstable::{SSTable, SSTableBuilder, SSTableEntry, SSTableReader};
use super::Entry;

/// Manages the on-disk half of the engine
///
/// ## Concurrency:
/// - `sstables`: RwLock (lookups need the write half because readers seek)
/// - `next_sstable_id`: atomic counter
pub struct StorageManager {
    data_dir: PathBuf,

    /// Open SSTable readers, ordered newest → oldest
    sstables: RwLock<Vec<SSTableReader>>,

    next_sstable_id: AtomicU64,

    verify_checksums: bool,
}

impl StorageManager {
    /// Open or create storage in the given directory
    ///
    /// 1. Create directory if it doesn't exist
    /// 2. Discover existing SSTable files
    /// 3. Open readers for each (loads indexes into RAM)
    /// 4. Order by ID descending (newest first)
    pub fn open(path: &Path, verify_checksums: bool) -> Result<Self> {
        fs::create_dir_all(path)?;

        let mut sstable_ids: Vec<u64> = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() {
                if let Some(id) = Self::parse_sstable_id(&file_path) {
                    sstable_ids.push(id);
                }
            }
        }
        sstable_ids.sort_unstable_by(|a, b| b.cmp(a));

        let mut sstables = Vec::with_capacity(sstable_ids.len());
        for id in &sstable_ids {
            let sstable_path = Self::sstable_path_with_dir(path, *id);
            sstables.push(SSTableReader::open(&sstable_path, verify_checksums)?);
        }

        let next_id = sstable_ids.first().map(|&id| id + 1).unwrap_or(1);

        Ok(Self {
            data_dir: path.to_path_buf(),
            sstables: RwLock::new(sstables),
            next_sstable_id: AtomicU64::new(next_id),
            verify_checksums,
        })
    }

    /// Look a key up in all SSTables, newest → oldest
    ///
    /// Returns the newest entry for the key (a tombstone included), or
    /// `None` if no SSTable has ever seen it.
    pub fn get(&self, key: &[u8]) -> Result<Option<Entry>> {
        let mut sstables = self.sstables.write();

        for reader in sstables.iter_mut() {
            if !reader.might_contain(key) {
                continue;
            }
            if let Some(entry) = reader.get(key)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Merged view of every key starting with `prefix`
    ///
    /// Newer SSTables shadow older ones; tombstones are kept so the caller
    /// can let them shadow nothing further down.
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<BTreeMap<Vec<u8>, Entry>> {
        let mut sstables = self.sstables.write();
        let mut merged = BTreeMap::new();

        // Oldest first so newer entries overwrite.
        for reader in sstables.iter_mut().rev() {
            if !reader.might_contain_prefix(prefix) {
                continue;
            }
            for (key, entry) in reader.scan_prefix(prefix)? {
                merged.insert(key, entry);
            }
        }
        Ok(merged)
    }

    /// Write sorted entries to a new SSTable and make it the newest
    pub fn flush<I>(&self, entries: I) -> Result<SSTable>
    where
        I: IntoIterator<Item = SSTableEntry>,
    {
        let id = self.next_sstable_id.fetch_add(1, Ordering::SeqCst);
        let path = self.sstable_path(id);

        let mut builder = SSTableBuilder::new(&path)?;
        for (key, entry) in entries {
            match entry {
                Entry::Value(v) => builder.add(&key, &v)?,
                Entry::Tombstone => builder.add_tombstone(&key)?,
            }
        }
        let metadata = builder.finish()?;

        let reader = SSTableReader::open(&path, self.verify_checksums)?;
        self.sstables.write().insert(0, reader);

        tracing::debug!(
            sstable = %path.display(),
            entries = metadata.entry_count,
            bytes = metadata.file_size,
            "flushed memtable"
        );
        Ok(metadata)
    }

    /// Merge every SSTable into a single one, dropping tombstones and
    /// shadowed values
    ///
    /// Only valid when nothing older than these SSTables exists, which is
    /// always the case for a full merge. Streams entries, so memory use is
    /// bounded by one entry per SSTable.
    pub fn compact(&self) -> Result<Option<SSTable>> {
        let mut sstables = self.sstables.write();
        if sstables.len() < 2 {
            return Ok(None);
        }
        let input_count = sstables.len();

        let id = self.next_sstable_id.fetch_add(1, Ordering::SeqCst);
        let path = self.sstable_path(id);
        let mut builder = SSTableBuilder::new(&path)?;

        {
            // Index 0 is the newest source.
            let mut sources = Vec::with_capacity(sstables.len());
            for reader in sstables.iter_mut() {
                sources.push(reader.iter()?);
            }
            let mut heads: Vec<Option<SSTableEntry>> = Vec::with_capacity(sources.len());
            for source in sources.iter_mut() {
                heads.push(source.next().transpose()?);
            }

            loop {
                let min_key = heads
                    .iter()
                    .flatten()
                    .map(|(k, _)| k)
                    .min()
                    .cloned();
                let Some(min_key) = min_key else { break };

                let mut winner: Option<Entry> = None;
                for (i, head) in heads.iter_mut().enumerate() {
                    if head.as_ref().is_some_and(|(k, _)| *k == min_key) {
                        if let Some((_, entry)) = head.take() {
                            if winner.is_none() {
                                winner = Some(entry);
                            }
                        }
                        *head = sources[i].next().transpose()?;
                    }
                }

                if let Some(Entry::Value(v)) = winner {
                    builder.add(&min_key, &v)?;
                }
            }
        }

        let live = builder.entry_count();
        let metadata = builder.finish()?;

        let old_paths: Vec<PathBuf> = sstables.iter().map(|r| r.path().to_path_buf()).collect();
        sstables.clear();
        if live > 0 {
            sstables.push(SSTableReader::open(&path, self.verify_checksums)?);
        } else {
            fs::remove_file(&path)?;
        }
        for old in &old_paths {
            fs::remove_file(old)?;
        }

        tracing::debug!(
            inputs = input_count,
            entries = metadata.entry_count,
            bytes = metadata.file_size,
            "compacted sstables"
        );
        Ok(Some(metadata))
    }

    pub fn sstable_count(&self) -> usize {
        self.sstables.read().len()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Next SSTable ID (for testing/debugging)
    pub fn next_sstable_id(&self) -> u64 {
        self.next_sstable_id.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn sstable_path(&self, id: u64) -> PathBuf {
        Self::sstable_path_with_dir(&self.data_dir, id)
    }

    fn sstable_path_with_dir(dir: &Path, id: u64) -> PathBuf {
        dir.join(format!("sstable_{:06}.sst", id))
    }

    /// "sstable_000042.sst" → Some(42)
    fn parse_sstable_id(path: &Path) -> Option<u64> {
        if path.extension()? != "sst" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        let id_str = name.strip_prefix("sstable_")?;
        id_str.parse().ok()
    }
}
