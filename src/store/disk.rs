//! Disk-backed backend
//!
//! Cells live in a [`kv::Engine`](crate::kv::Engine) rooted in a temporary
//! directory that belongs to this store alone. Memory use is bounded by the
//! engine's cache budget, not by the number of cells.
//!
//! ## Record Layout
//! ```text
//! "{sheet}:{row:06}:{col:06}"              → bincode(StoredValue)
//! "{sheet}:{row:06}:{col:06}#style"        → bincode(Style)
//! "{sheet}:{row:06}:{col:06}#validation"   → bincode(DataValidation)
//! ```
//!
//! A missing sidecar means the attribute is unset. Writes go validation,
//! style, then value, one entry at a time. If a later write fails the
//! earlier ones stay; there is no rollback, and the caller must treat the
//! record as indeterminate and retry the whole write.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::cell::{Cell, CellKind, RowHandle};
use crate::config::Config;
use crate::error::{CellStoreError, Result};
use crate::key;
use crate::kv::Engine;
use crate::row::Row;
use crate::style::Style;
use crate::validation::DataValidation;

use super::{CellStore, CellVisitor};

/// Sidecar key suffix for the style record
pub const STYLE_SUFFIX: &str = "#style";

/// Sidecar key suffix for the data-validation record
pub const VALIDATION_SUFFIX: &str = "#validation";

/// Primary record: everything about a cell except its sidecars
#[derive(Debug, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    kind: CellKind,
}

/// Backend persisting cells to an on-disk, bounded-cache engine
pub struct DiskCellStore {
    engine: Engine,
    /// Removed on close (or drop)
    base_dir: TempDir,
    /// Reused encode buffer
    buf: Vec<u8>,
}

impl DiskCellStore {
    /// Create a store in a fresh directory under `config.temp_root`
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.temp_root)?;
        let base_dir = tempfile::Builder::new()
            .prefix(&config.dir_prefix)
            .tempdir_in(&config.temp_root)?;
        let engine = Engine::open(base_dir.path(), config)?;

        tracing::info!(
            dir = %base_dir.path().display(),
            cache_bytes = config.cache_size_bytes,
            "opened disk cell store"
        );

        Ok(Self {
            engine,
            base_dir,
            buf: Vec::with_capacity(256),
        })
    }

    /// The directory this store owns
    pub fn base_dir(&self) -> &Path {
        self.base_dir.path()
    }

    /// The underlying engine (for inspection)
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    // =========================================================================
    // Record Helpers
    // =========================================================================

    fn put_record<T: Serialize>(&mut self, key: &str, record: &T) -> Result<()> {
        self.buf.clear();
        bincode::serialize_into(&mut self.buf, record)?;
        self.engine.put(key.as_bytes(), &self.buf)
    }

    fn get_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.engine.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Store `record` under `key`, or remove a stale one if unset
    fn write_sidecar<T: Serialize>(&mut self, key: &str, record: Option<&T>) -> Result<()> {
        match record {
            Some(record) => self.put_record(key, record),
            None => self.remove_if_present(key),
        }
    }

    /// Skips the tombstone when the key was never written
    fn remove_if_present(&mut self, key: &str) -> Result<()> {
        if self.engine.contains_key(key.as_bytes())? {
            self.engine.delete(key.as_bytes())?;
        }
        Ok(())
    }

    pub(crate) fn write_style(&mut self, cell: &Cell) -> Result<()> {
        let key = sidecar_key(&cell.key(), STYLE_SUFFIX);
        self.write_sidecar(&key, cell.style())
    }

    pub(crate) fn read_style(&self, key: &str) -> Result<Option<Style>> {
        self.get_record(&sidecar_key(key, STYLE_SUFFIX))
    }

    pub(crate) fn write_data_validation(&mut self, cell: &Cell) -> Result<()> {
        let key = sidecar_key(&cell.key(), VALIDATION_SUFFIX);
        self.write_sidecar(&key, cell.data_validation())
    }

    pub(crate) fn read_data_validation(&self, key: &str) -> Result<Option<DataValidation>> {
        self.get_record(&sidecar_key(key, VALIDATION_SUFFIX))
    }
}

impl CellStore for DiskCellStore {
    fn read_cell(&mut self, key: &str) -> Result<Cell> {
        let Some(stored) = self.get_record::<StoredValue>(key)? else {
            return Err(CellStoreError::not_found(key, "No such cell"));
        };
        let coord =
            key::parse_cell_key(key).ok_or_else(|| CellStoreError::InvalidKey(key.to_string()))?;

        let style = self.read_style(key)?;
        let validation = self.read_data_validation(key)?;

        let handle = RowHandle::new(coord.sheet.into(), coord.row);
        let mut cell = Cell::with_handle(handle, coord.col);
        cell.set_value(stored.value, stored.kind);
        cell.set_parts(style, validation);
        Ok(cell)
    }

    fn write_cell(&mut self, cell: &Cell) -> Result<()> {
        let key = cell.key();
        tracing::trace!(key = %key, "disk store write");

        self.write_data_validation(cell)?;
        self.write_style(cell)?;
        let stored = StoredValue {
            value: cell.value().to_string(),
            kind: cell.kind(),
        };
        self.put_record(&key, &stored)
    }

    fn delete_cell(&mut self, key: &str) -> Result<()> {
        tracing::trace!(key = %key, "disk store delete");
        self.remove_if_present(key)?;
        self.remove_if_present(&sidecar_key(key, STYLE_SUFFIX))?;
        self.remove_if_present(&sidecar_key(key, VALIDATION_SUFFIX))
    }

    fn for_each_in_row(&mut self, row: &Row, visitor: &mut CellVisitor<'_>) -> Result<()> {
        let prefix = key::row_scan_prefix(&row.row_prefix());

        // A cell's sidecars sort directly after its primary record, so one
        // ordered pass assembles each cell before the next one starts.
        let mut pending: Option<(String, Cell)> = None;
        for (raw, bytes) in self.engine.scan_prefix(prefix.as_bytes())? {
            let key = String::from_utf8(raw)
                .map_err(|e| CellStoreError::InvalidKey(e.to_string()))?;

            if let Some(coord) = key::parse_cell_key(&key) {
                if coord.sheet != row.sheet_name() || coord.row != row.num() {
                    continue;
                }
                if let Some((_, cell)) = pending.take() {
                    visitor(cell)?;
                }
                let stored: StoredValue = bincode::deserialize(&bytes)?;
                let mut cell = Cell::with_handle(row.handle().clone(), coord.col);
                cell.set_value(stored.value, stored.kind);
                pending = Some((key, cell));
                continue;
            }

            let Some((primary, cell)) = pending.as_mut() else {
                continue;
            };
            match key.strip_prefix(primary.as_str()) {
                Some(STYLE_SUFFIX) => cell.set_style(bincode::deserialize(&bytes)?),
                Some(VALIDATION_SUFFIX) => {
                    cell.set_data_validation(bincode::deserialize(&bytes)?)
                }
                _ => {}
            }
        }

        if let Some((_, cell)) = pending {
            visitor(cell)?;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        let Self { engine, base_dir, .. } = *self;
        let path = base_dir.path().to_path_buf();
        // Release file handles before removing the directory.
        drop(engine);
        if let Err(e) = base_dir.close() {
            tracing::warn!(dir = %path.display(), error = %e, "failed to remove store directory");
            return Err(e.into());
        }
        tracing::info!(dir = %path.display(), "closed disk cell store");
        Ok(())
    }
}

fn sidecar_key(cell_key: &str, suffix: &str) -> String {
    let mut key = String::with_capacity(cell_key.len() + suffix.len());
    key.push_str(cell_key);
    key.push_str(suffix);
    key
}
