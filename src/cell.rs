//! Cell record
//!
//! The unit a backend stores: a value, an optional style, and an optional
//! data-validation rule. A cell knows its coordinates through a non-owning
//! [`RowHandle`]; backends never persist the handle, only the key derived
//! from it, and the owning [`Row`] re-attaches itself on every read.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CellStoreError, Result};
use crate::key;
use crate::row::Row;
use crate::style::Style;
use crate::validation::DataValidation;

/// Coordinates of the row a cell belongs to
///
/// Plain data: cloning it never extends the lifetime of the Row itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowHandle {
    sheet: Arc<str>,
    num: usize,
}

impl RowHandle {
    pub(crate) fn new(sheet: Arc<str>, num: usize) -> Self {
        Self { sheet, num }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn row_prefix(&self) -> String {
        key::format_row_prefix(&self.sheet, self.num)
    }
}

/// How the stored value string should be interpreted
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CellKind {
    #[default]
    Empty,
    String,
    Numeric,
    Bool,
    Formula,
    Error,
}

/// A single spreadsheet cell
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    row: RowHandle,
    col: usize,
    value: String,
    kind: CellKind,
    style: Option<Style>,
    data_validation: Option<DataValidation>,
}

impl Cell {
    /// A transient, not yet persisted cell at column `col` of `row`
    pub fn new(row: &Row, col: usize) -> Result<Self> {
        key::check_index(col)?;
        Ok(Self::with_handle(row.handle().clone(), col))
    }

    pub(crate) fn with_handle(row: RowHandle, col: usize) -> Self {
        Self {
            row,
            col,
            value: String::new(),
            kind: CellKind::Empty,
            style: None,
            data_validation: None,
        }
    }

    /// Storage key derived from (sheet, row, column)
    pub fn key(&self) -> String {
        key::format_cell_key(&self.row.sheet, self.row.num, self.col)
    }

    pub fn row(&self) -> &RowHandle {
        &self.row
    }

    pub fn row_num(&self) -> usize {
        self.row.num
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn sheet_name(&self) -> &str {
        &self.row.sheet
    }

    /// Point this cell back at `row`; coordinates must already match
    pub(crate) fn attach(&mut self, row: &Row) {
        debug_assert_eq!(self.row.num, row.num());
        self.row = row.handle().clone();
    }

    // =========================================================================
    // Value
    // =========================================================================

    /// The formatted value
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Set an already formatted value together with its kind
    pub fn set_value(&mut self, value: impl Into<String>, kind: CellKind) {
        self.value = value.into();
        self.kind = kind;
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        self.set_value(value, CellKind::String);
    }

    pub fn set_int(&mut self, value: i64) {
        self.set_value(value.to_string(), CellKind::Numeric);
    }

    pub fn set_float(&mut self, value: f64) {
        self.set_value(value.to_string(), CellKind::Numeric);
    }

    pub fn set_bool(&mut self, value: bool) {
        self.set_value(if value { "1" } else { "0" }, CellKind::Bool);
    }

    /// Store formula text; the cached result is not tracked here
    pub fn set_formula(&mut self, formula: impl Into<String>) {
        self.set_value(formula, CellKind::Formula);
    }

    pub fn clear(&mut self) {
        self.set_value(String::new(), CellKind::Empty);
    }

    pub fn is_empty(&self) -> bool {
        self.kind == CellKind::Empty
    }

    pub fn as_int(&self) -> Result<i64> {
        self.value
            .trim()
            .parse()
            .map_err(|e| self.invalid_value(format!("not an integer: {}", e)))
    }

    pub fn as_float(&self) -> Result<f64> {
        self.value
            .trim()
            .parse()
            .map_err(|e| self.invalid_value(format!("not a number: {}", e)))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self.value.trim() {
            "1" | "TRUE" | "true" => Ok(true),
            "0" | "FALSE" | "false" | "" => Ok(false),
            other => Err(self.invalid_value(format!("not a boolean: {:?}", other))),
        }
    }

    fn invalid_value(&self, reason: String) -> CellStoreError {
        CellStoreError::InvalidValue {
            key: self.key(),
            reason,
        }
    }

    // =========================================================================
    // Style / Validation
    // =========================================================================

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = Some(style);
    }

    pub fn clear_style(&mut self) {
        self.style = None;
    }

    pub fn data_validation(&self) -> Option<&DataValidation> {
        self.data_validation.as_ref()
    }

    pub fn set_data_validation(&mut self, validation: DataValidation) {
        self.data_validation = Some(validation);
    }

    pub fn clear_data_validation(&mut self) {
        self.data_validation = None;
    }

    pub(crate) fn set_parts(
        &mut self,
        style: Option<Style>,
        data_validation: Option<DataValidation>,
    ) {
        self.style = style;
        self.data_validation = data_validation;
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
