//! In-memory backend
//!
//! Two hash maps: key → cell for point lookups, and row prefix → set of
//! keys for row scans. Neither map is ordered, so row scans sort the keys
//! before visiting.

use std::collections::{HashMap, HashSet};

use crate::cell::Cell;
use crate::error::{CellStoreError, Result};
use crate::key;
use crate::row::Row;

use super::{CellStore, CellVisitor};

/// Volatile backend keeping every cell in process memory
#[derive(Debug, Default)]
pub struct MemoryCellStore {
    /// Row prefix → keys of the cells stored in that row
    rows: HashMap<String, HashSet<String>>,
    /// Key → cell
    cells: HashMap<String, Cell>,
}

impl MemoryCellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rows holding at least one cell
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl CellStore for MemoryCellStore {
    fn read_cell(&mut self, key: &str) -> Result<Cell> {
        self.cells
            .get(key)
            .cloned()
            .ok_or_else(|| CellStoreError::not_found(key, "No such cell"))
    }

    fn write_cell(&mut self, cell: &Cell) -> Result<()> {
        let key = cell.key();
        tracing::trace!(key = %key, "memory store write");
        self.rows
            .entry(cell.row().row_prefix())
            .or_default()
            .insert(key.clone());
        self.cells.insert(key, cell.clone());
        Ok(())
    }

    fn delete_cell(&mut self, key: &str) -> Result<()> {
        if self.cells.remove(key).is_none() {
            return Ok(());
        }
        let prefix = key::row_prefix_of(key)?;
        if let Some(keys) = self.rows.get_mut(prefix) {
            keys.remove(key);
            if keys.is_empty() {
                self.rows.remove(prefix);
            }
        }
        Ok(())
    }

    fn for_each_in_row(&mut self, row: &Row, visitor: &mut CellVisitor<'_>) -> Result<()> {
        let Some(refs) = self.rows.get(&row.row_prefix()) else {
            return Ok(());
        };

        // Collect and sort first: HashSet iteration order is arbitrary.
        let mut keys: Vec<&String> = Vec::with_capacity(row.cell_count().max(refs.len()));
        keys.extend(refs.iter());
        keys.sort();

        for k in keys {
            if let Some(cell) = self.cells.get(k) {
                visitor(cell.clone())?;
            }
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
