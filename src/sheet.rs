//! Sheet
//!
//! The minimal owner tying rows to one backend. A sheet is created from a
//! [`CellStoreConstructor`], so each sheet of a document may use a
//! different backend.

use std::collections::btree_map::{BTreeMap, Entry};
use std::sync::Arc;

use crate::cell::Cell;
use crate::error::{CellStoreError, Result};
use crate::row::Row;
use crate::store::{CellStore, CellStoreConstructor};

/// Longest sheet name a spreadsheet accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters a sheet name must not contain
const FORBIDDEN_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// A named sheet of rows backed by one cell store
///
/// Rows are created on first use and held sparsely, so touching row
/// 999 999 allocates one row, not a million.
pub struct Sheet {
    name: Arc<str>,
    /// Row number → row, only for rows that have been addressed
    rows: BTreeMap<usize, Row>,
    store: Box<dyn CellStore>,
}

impl Sheet {
    /// Create a sheet using a fresh backend from `constructor`
    pub fn new(name: &str, constructor: &CellStoreConstructor) -> Result<Self> {
        validate_sheet_name(name)?;
        let store = constructor()?;
        Ok(Self::from_parts(name, store))
    }

    /// Create a sheet around an already opened backend
    pub fn with_store(name: &str, store: Box<dyn CellStore>) -> Result<Self> {
        validate_sheet_name(name)?;
        Ok(Self::from_parts(name, store))
    }

    fn from_parts(name: &str, store: Box<dyn CellStore>) -> Self {
        Self {
            name: Arc::from(name),
            rows: BTreeMap::new(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Highest addressed row number plus one
    pub fn row_count(&self) -> usize {
        self.rows.keys().next_back().map_or(0, |&num| num + 1)
    }

    /// Append a new row after the highest addressed one and return its index
    pub fn add_row(&mut self) -> Result<usize> {
        let num = self.row_count();
        self.row_mut(num)?;
        Ok(num)
    }

    /// Row `num`, creating it if it has not been addressed yet
    pub fn row_mut(&mut self, num: usize) -> Result<&mut Row> {
        sparse_row(&mut self.rows, &self.name, num)
    }

    /// Row `num` if it has been addressed
    pub fn row(&self, num: usize) -> Option<&Row> {
        self.rows.get(&num)
    }

    /// Direct access to the backend
    pub fn store_mut(&mut self) -> &mut dyn CellStore {
        self.store.as_mut()
    }

    // =========================================================================
    // Cell Access (forwarded through the row)
    // =========================================================================

    /// Create a transient cell in the next free column of row `row`
    pub fn add_cell(&mut self, row: usize) -> Result<Cell> {
        self.row_mut(row)?.add_cell()
    }

    /// Stored cell at (`row`, `col`), or a transient one if none exists
    pub fn get_cell(&mut self, row: usize, col: usize) -> Result<Cell> {
        let Self { rows, store, name } = self;
        let row = sparse_row(rows, name, row)?;
        row.get_cell(store.as_mut(), col)
    }

    /// Persist `cell`, which must belong to this sheet
    pub fn write_cell(&mut self, cell: &Cell) -> Result<()> {
        if cell.sheet_name() != &*self.name {
            return Err(CellStoreError::WrongSheet {
                key: cell.key(),
                expected: self.name.to_string(),
                actual: cell.sheet_name().to_string(),
            });
        }
        let Self { rows, store, name } = self;
        let row = sparse_row(rows, name, cell.row_num())?;
        row.write_cell(store.as_mut(), cell)
    }

    /// Remove the cell at (`row`, `col`)
    pub fn delete_cell(&mut self, row: usize, col: usize) -> Result<()> {
        let Self { rows, store, .. } = self;
        match rows.get(&row) {
            Some(r) => r.delete_cell(store.as_mut(), col),
            None => Ok(()),
        }
    }

    /// Visit each stored cell of row `row` in column order
    pub fn for_each_in_row<F>(&mut self, row: usize, visitor: F) -> Result<()>
    where
        F: FnMut(Cell) -> Result<()>,
    {
        let Self { rows, store, .. } = self;
        match rows.get(&row) {
            Some(r) => r.for_each_cell(store.as_mut(), visitor),
            None => Ok(()),
        }
    }

    /// Close the backend; the sheet cannot be used afterwards
    pub fn close(self) -> Result<()> {
        tracing::debug!(sheet = %self.name, rows = self.rows.len(), "closing sheet");
        self.store.close()
    }
}

fn sparse_row<'a>(
    rows: &'a mut BTreeMap<usize, Row>,
    sheet: &Arc<str>,
    num: usize,
) -> Result<&'a mut Row> {
    match rows.entry(num) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => Ok(entry.insert(Row::new(Arc::clone(sheet), num)?)),
    }
}

/// Check a sheet name against spreadsheet naming rules
///
/// Excluding `:` also keeps sheet names from colliding inside storage keys.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| CellStoreError::InvalidSheetName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(invalid("name is longer than 31 characters"));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(CellStoreError::InvalidSheetName {
            name: name.to_string(),
            reason: format!("name contains forbidden character {:?}", c),
        });
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(invalid("name starts or ends with an apostrophe"));
    }
    Ok(())
}
