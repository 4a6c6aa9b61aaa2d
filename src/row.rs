//! Row
//!
//! A row holds no cells. It knows its coordinates, derives cell keys from
//! them, and forwards every read and write to the sheet's backend.
//!
//! `cell_count` is growth-only: it records the highest column index ever
//! addressed through this row plus one, not the number of stored records.
//! Deleting a cell never lowers it.

use std::sync::Arc;

use crate::cell::{Cell, RowHandle};
use crate::error::Result;
use crate::key;
use crate::store::CellStore;

/// Points per centimetre
const POINTS_PER_CM: f64 = 28.3464567;

/// A single row of a sheet
#[derive(Clone, Debug)]
pub struct Row {
    handle: RowHandle,
    /// Height in points
    height: f64,
    hidden: bool,
    /// Outline level used for collapsing groups
    outline_level: u8,
    /// Set once any display attribute has been changed
    is_custom: bool,
    cell_count: usize,
}

impl Row {
    /// Row `num` (zero-based) of the sheet named `sheet`
    pub fn new(sheet: impl Into<Arc<str>>, num: usize) -> Result<Self> {
        let sheet = sheet.into();
        key::check_sheet(&sheet)?;
        key::check_index(num)?;
        Ok(Self {
            handle: RowHandle::new(sheet, num),
            height: 0.0,
            hidden: false,
            outline_level: 0,
            is_custom: false,
            cell_count: 0,
        })
    }

    pub fn num(&self) -> usize {
        self.handle.num()
    }

    pub fn sheet_name(&self) -> &str {
        self.handle.sheet()
    }

    pub fn handle(&self) -> &RowHandle {
        &self.handle
    }

    /// Highest column index ever addressed plus one
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    // =========================================================================
    // Key Derivation
    // =========================================================================

    /// Storage key of the cell at column `col` of this row
    pub fn cell_key(&self, col: usize) -> Result<String> {
        key::cell_key(self.sheet_name(), self.num(), col)
    }

    /// Prefix shared by the keys of every cell in this row
    pub fn row_prefix(&self) -> String {
        self.handle.row_prefix()
    }

    // =========================================================================
    // Display Attributes
    // =========================================================================

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Set the height in points
    pub fn set_height(&mut self, points: f64) {
        self.height = points;
        self.is_custom = true;
    }

    /// Set the height in centimetres
    pub fn set_height_cm(&mut self, cm: f64) {
        self.set_height(cm * POINTS_PER_CM);
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.is_custom = true;
    }

    pub fn outline_level(&self) -> u8 {
        self.outline_level
    }

    pub fn set_outline_level(&mut self, level: u8) {
        self.outline_level = level;
        self.is_custom = true;
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    // =========================================================================
    // Cell Access
    // =========================================================================

    /// Create a transient cell in the next free column
    pub fn add_cell(&mut self) -> Result<Cell> {
        let cell = Cell::new(self, self.cell_count)?;
        self.cell_count += 1;
        Ok(cell)
    }

    /// Fetch the cell at `col`, or a fresh transient cell if none is stored
    ///
    /// Only CellNotFound is treated as "not stored"; any other backend
    /// failure is returned.
    pub fn get_cell(&mut self, store: &mut dyn CellStore, col: usize) -> Result<Cell> {
        let key = self.cell_key(col)?;
        let cell = match store.read_cell(&key) {
            Ok(mut cell) => {
                cell.attach(self);
                cell
            }
            Err(e) if e.is_not_found() => Cell::new(self, col)?,
            Err(e) => return Err(e),
        };
        self.touch(col);
        Ok(cell)
    }

    /// Persist `cell` through `store`
    pub fn write_cell(&mut self, store: &mut dyn CellStore, cell: &Cell) -> Result<()> {
        store.write_cell(cell)?;
        self.touch(cell.col());
        Ok(())
    }

    /// Remove the cell at `col`; `cell_count` is left as is
    pub fn delete_cell(&self, store: &mut dyn CellStore, col: usize) -> Result<()> {
        let key = self.cell_key(col)?;
        store.delete_cell(&key)
    }

    /// Visit every stored cell of this row in column order
    pub fn for_each_cell<F>(&self, store: &mut dyn CellStore, mut visitor: F) -> Result<()>
    where
        F: FnMut(Cell) -> Result<()>,
    {
        store.for_each_in_row(self, &mut |mut cell: Cell| {
            cell.attach(self);
            visitor(cell)
        })
    }

    fn touch(&mut self, col: usize) {
        if col >= self.cell_count {
            self.cell_count = col + 1;
        }
    }
}
