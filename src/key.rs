//! Key Codec
//!
//! Maps a cell's logical coordinates to a sortable storage key.
//!
//! ## Key Format
//! ```text
//! ┌────────────┬───┬──────────────┬───┬──────────────┐
//! │ Sheet name │ : │ Row (6 dig.) │ : │ Col (6 dig.) │
//! └────────────┴───┴──────────────┴───┴──────────────┘
//!   "Sheet1:000012:000003"
//! ```
//!
//! The row prefix is the same encoding without the column field
//! (`"Sheet1:000012"`). Row and column use the same zero-padded width, so for
//! keys sharing a row prefix, lexicographic order equals ascending column
//! order. Indices above [`MAX_INDEX`] would widen the field and break that
//! ordering, so they are rejected with [`CellStoreError::KeyOverflow`].

use crate::error::{CellStoreError, Result};

/// Field separator
pub const SEPARATOR: char = ':';

/// Number of digits in the row and column fields
pub const FIELD_WIDTH: usize = 6;

/// Largest row or column index that fits in the field width
pub const MAX_INDEX: usize = 999_999;

/// Decoded coordinates of a cell key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCoord {
    pub sheet: String,
    pub row: usize,
    pub col: usize,
}

/// Fail with KeyOverflow if `index` does not fit the field width
pub fn check_index(index: usize) -> Result<()> {
    if index > MAX_INDEX {
        return Err(CellStoreError::KeyOverflow { index });
    }
    Ok(())
}

/// Fail with InvalidSheetName if `sheet` cannot be the first key field
///
/// An empty name or one containing the separator would let one sheet's keys
/// fall inside another sheet's row prefix.
pub fn check_sheet(sheet: &str) -> Result<()> {
    let reason = if sheet.is_empty() {
        "name is empty"
    } else if sheet.contains(SEPARATOR) {
        "name contains the key separator ':'"
    } else {
        return Ok(());
    };
    Err(CellStoreError::InvalidSheetName {
        name: sheet.to_string(),
        reason: reason.to_string(),
    })
}

/// Storage key of the cell at (`sheet`, `row`, `col`)
pub fn cell_key(sheet: &str, row: usize, col: usize) -> Result<String> {
    check_sheet(sheet)?;
    check_index(row)?;
    check_index(col)?;
    Ok(format_cell_key(sheet, row, col))
}

/// Key prefix shared by every cell of row `row` in `sheet`
pub fn row_prefix(sheet: &str, row: usize) -> Result<String> {
    check_sheet(sheet)?;
    check_index(row)?;
    Ok(format_row_prefix(sheet, row))
}

/// Extract the row prefix from a full cell key
pub fn row_prefix_of(key: &str) -> Result<&str> {
    let (prefix, col) = key
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| CellStoreError::InvalidKey(key.to_string()))?;
    if !is_field(col) {
        return Err(CellStoreError::InvalidKey(key.to_string()));
    }
    Ok(prefix)
}

/// Decode a full cell key back into its coordinates
///
/// Returns `None` for anything that is not exactly a cell key, including
/// sidecar keys (which carry a suffix after the column field).
pub fn parse_cell_key(key: &str) -> Option<CellCoord> {
    let (rest, col) = key.rsplit_once(SEPARATOR)?;
    let (sheet, row) = rest.rsplit_once(SEPARATOR)?;
    if sheet.is_empty() || !is_field(row) || !is_field(col) {
        return None;
    }
    Some(CellCoord {
        sheet: sheet.to_string(),
        row: row.parse().ok()?,
        col: col.parse().ok()?,
    })
}

/// Scan bound for a row: the row prefix plus the trailing separator
///
/// Scanning on `"S:000001:"` instead of `"S:000001"` keeps a range scan from
/// reaching into keys whose row field merely starts with the same digits.
pub fn row_scan_prefix(row_prefix: &str) -> String {
    let mut prefix = String::with_capacity(row_prefix.len() + 1);
    prefix.push_str(row_prefix);
    prefix.push(SEPARATOR);
    prefix
}

pub(crate) fn format_cell_key(sheet: &str, row: usize, col: usize) -> String {
    format!("{}:{:06}:{:06}", sheet, row, col)
}

pub(crate) fn format_row_prefix(sheet: &str, row: usize) -> String {
    format!("{}:{:06}", sheet, row)
}

fn is_field(s: &str) -> bool {
    s.len() == FIELD_WIDTH && s.bytes().all(|b| b.is_ascii_digit())
}
