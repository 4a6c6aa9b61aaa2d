//! SSTable Reader
//!
//! Opens SSTable files and provides O(log n) key lookups and prefix scans
//! via an in-memory index.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Bound;
use std::path::{Path, PathBuf};

use crate::error::{CellStoreError, Result};
use crate::kv::Entry;

use super::iterator::SSTableIterator;
use super::{
    read_u32, read_u64, SSTableEntry, FOOTER_SIZE, HEADER_SIZE, MAGIC, TOMBSTONE_MARKER,
    VERSION,
};

/// Reader for SSTable files with in-memory index for O(log n) lookups
pub struct SSTableReader {
    path: PathBuf,
    /// File handle for reading entries
    pub(super) file: BufReader<File>,
    /// key → file offset
    index: BTreeMap<Vec<u8>, u64>,
    entry_count: u64,
    /// Index block starting offset (end of the data block)
    pub(super) index_offset: u64,
}

impl SSTableReader {
    /// Open an SSTable for reading
    ///
    /// Loads the entire index into memory. With `verify_checksum` the data
    /// block is re-hashed and compared against the footer CRC.
    pub fn open(path: &Path, verify_checksum: bool) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();
        if file_size < HEADER_SIZE + FOOTER_SIZE {
            return Err(CellStoreError::Storage(format!(
                "SSTable {} is truncated ({} bytes)",
                path.display(),
                file_size
            )));
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(CellStoreError::Storage(format!(
                "Invalid SSTable magic: expected CSST, got {:?}",
                &header[0..4]
            )));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(CellStoreError::Storage(format!(
                "Unsupported SSTable version: {}",
                version
            )));
        }

        let entry_count = read_u64(&header[6..14]);

        file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let mut footer = [0u8; FOOTER_SIZE as usize];
        file.read_exact(&mut footer)?;

        let index_offset = read_u64(&footer[0..8]);
        let data_crc = read_u32(&footer[8..12]);
        if index_offset < HEADER_SIZE || index_offset > file_size - FOOTER_SIZE {
            return Err(CellStoreError::Storage(format!(
                "SSTable {} has a bad index offset {}",
                path.display(),
                index_offset
            )));
        }

        if verify_checksum {
            file.seek(SeekFrom::Start(HEADER_SIZE))?;
            let mut hasher = crc32fast::Hasher::new();
            let mut remaining = index_offset - HEADER_SIZE;
            let mut chunk = vec![0u8; 64 * 1024];
            while remaining > 0 {
                let n = remaining.min(chunk.len() as u64) as usize;
                file.read_exact(&mut chunk[..n])?;
                hasher.update(&chunk[..n]);
                remaining -= n as u64;
            }
            let actual = hasher.finalize();
            if actual != data_crc {
                return Err(CellStoreError::Storage(format!(
                    "SSTable {} checksum mismatch: expected {:08x}, got {:08x}",
                    path.display(),
                    data_crc,
                    actual
                )));
            }
        }

        // Index block size = file_size - footer_size - index_offset
        let index_block_size = file_size - FOOTER_SIZE - index_offset;
        let mut index_data = vec![0u8; index_block_size as usize];
        file.seek(SeekFrom::Start(index_offset))?;
        file.read_exact(&mut index_data)?;

        // [key_len(4)][offset(8)][key]
        let mut index = BTreeMap::new();
        let mut pos = 0;
        while pos < index_data.len() {
            if pos + 12 > index_data.len() {
                return Err(CellStoreError::Storage(format!(
                    "SSTable {} has a torn index entry at {}",
                    path.display(),
                    pos
                )));
            }
            let key_len = read_u32(&index_data[pos..pos + 4]) as usize;
            let offset = read_u64(&index_data[pos + 4..pos + 12]);
            pos += 12;

            if pos + key_len > index_data.len() {
                return Err(CellStoreError::Storage(format!(
                    "SSTable {} has a torn index key at {}",
                    path.display(),
                    pos
                )));
            }
            index.insert(index_data[pos..pos + key_len].to_vec(), offset);
            pos += key_len;
        }

        file.seek(SeekFrom::Start(0))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: BufReader::new(file),
            index,
            entry_count,
            index_offset,
        })
    }

    /// Look up a key in O(log n) via the in-memory index
    ///
    /// Returns:
    /// - `Ok(Some(Entry::Value(_)))`: key found with value
    /// - `Ok(Some(Entry::Tombstone))`: key deleted in this SSTable
    /// - `Ok(None)`: key not in this SSTable
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Entry>> {
        let offset = match self.index.get(key) {
            Some(&off) => off,
            None => return Ok(None),
        };
        self.read_entry_at(offset).map(|(_, entry)| Some(entry))
    }

    /// All entries whose key starts with `prefix`, in key order
    pub fn scan_prefix(&mut self, prefix: &[u8]) -> Result<Vec<SSTableEntry>> {
        let offsets: Vec<u64> = self
            .index
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, &off)| off)
            .collect();

        let mut entries = Vec::with_capacity(offsets.len());
        for offset in offsets {
            entries.push(self.read_entry_at(offset)?);
        }
        Ok(entries)
    }

    fn read_entry_at(&mut self, offset: u64) -> Result<SSTableEntry> {
        self.file.seek(SeekFrom::Start(offset))?;

        let mut header = [0u8; 8];
        self.file.read_exact(&mut header)?;
        let key_len = read_u32(&header[0..4]) as usize;
        let val_len = read_u32(&header[4..8]);

        let mut key = vec![0u8; key_len];
        self.file.read_exact(&mut key)?;

        if val_len == TOMBSTONE_MARKER {
            return Ok((key, Entry::Tombstone));
        }

        let mut value = vec![0u8; val_len as usize];
        self.file.read_exact(&mut value)?;
        Ok((key, Entry::Value(value)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Smallest key in this SSTable
    pub fn min_key(&self) -> Option<&[u8]> {
        self.index.keys().next().map(|k| k.as_slice())
    }

    /// Largest key in this SSTable
    pub fn max_key(&self) -> Option<&[u8]> {
        self.index.keys().next_back().map(|k| k.as_slice())
    }

    /// Returns false only if the key is definitely outside [min_key, max_key]
    pub fn might_contain(&self, key: &[u8]) -> bool {
        match (self.min_key(), self.max_key()) {
            (Some(min), Some(max)) => key >= min && key <= max,
            _ => false,
        }
    }

    /// Returns false only if no key in the table can start with `prefix`
    pub fn might_contain_prefix(&self, prefix: &[u8]) -> bool {
        match (self.min_key(), self.max_key()) {
            (Some(min), Some(max)) => max >= prefix && (min <= prefix || min.starts_with(prefix)),
            _ => false,
        }
    }

    /// Sequential iterator over all entries (used by compaction)
    pub fn iter(&mut self) -> Result<SSTableIterator<'_>> {
        SSTableIterator::new(&mut self.file, self.index_offset)
    }
}
