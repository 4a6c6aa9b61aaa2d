//! Tests for the storage contract
//!
//! Every test runs against both backends. These tests verify:
//! - Write/read round-trips of value, style and data validation
//! - Ordered row visitation that skips unwritten columns
//! - CellNotFound for keys that were never written
//! - Delete removes a cell from reads and from row scans
//! - Idempotent writes
//! - Visitor errors abort enumeration and come back unchanged

use std::fmt;

use cellstore::style::{Border, BorderStyle, Color, Style};
use cellstore::validation::{CellRange, DataValidation, DataValidationErrorStyle};
use cellstore::{key, BackendKind, Cell, CellKind, CellStore, CellStoreError, Config, Row};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// One instance of each backend; the TempDir keeps the disk store's root alive
fn backends() -> Vec<(BackendKind, TempDir, Box<dyn CellStore>)> {
    [BackendKind::Memory, BackendKind::Disk]
        .into_iter()
        .map(|kind| {
            let temp = TempDir::new().unwrap();
            let config = Config::builder().temp_root(temp.path()).build();
            let store = kind.open(&config).unwrap();
            (kind, temp, store)
        })
        .collect()
}

fn border_style() -> Style {
    let mut style = Style::new();
    style.border = Border::all(BorderStyle::Thin);
    style.apply_border = true;
    style
}

fn drop_list_validation() -> DataValidation {
    let mut dv = DataValidation::new(CellRange::new(0, 0, 0, 0), true);
    dv.set_drop_list(&["a1", "a2", "a3"]).unwrap();
    dv.set_input(Some("cell"), Some("cell msg"));
    dv
}

fn string_cell(row: &Row, col: usize, value: &str) -> Cell {
    let mut cell = Cell::new(row, col).unwrap();
    cell.set_string(value);
    cell
}

fn visited_cols(store: &mut dyn CellStore, row: &Row) -> Vec<usize> {
    let mut cols = Vec::new();
    store
        .for_each_in_row(row, &mut |cell: Cell| {
            cols.push(cell.col());
            Ok(())
        })
        .unwrap();
    cols
}

#[derive(Debug)]
struct Stop(usize);

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stopped at column {}", self.0)
    }
}

impl std::error::Error for Stop {}

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_write_and_read_value_and_style() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 0).unwrap();
        let mut cell = string_cell(&row, 0, "A cell!");
        cell.set_style(border_style());

        store.write_cell(&cell).unwrap();
        let read = store.read_cell(&row.cell_key(0).unwrap()).unwrap();

        assert_eq!(read.value(), "A cell!", "{:?}", kind);
        assert_eq!(read.style(), Some(&border_style()), "{:?}", kind);
        assert_eq!(read.data_validation(), None, "{:?}", kind);
        store.close().unwrap();
    }
}

#[test]
fn test_write_and_read_data_validation() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("Sheet1", 0).unwrap();
        let mut cell = Cell::new(&row, 0).unwrap();
        cell.set_data_validation(drop_list_validation());

        store.write_cell(&cell).unwrap();
        let read = store.read_cell(&cell.key()).unwrap();

        assert_eq!(read.data_validation(), Some(&drop_list_validation()), "{:?}", kind);
        assert_eq!(read.style(), None, "{:?}", kind);
        store.close().unwrap();
    }
}

#[test]
fn test_round_trip_all_part_combinations() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 4).unwrap();
        let mut cells = Vec::new();
        for (col, (with_style, with_validation)) in
            [(false, false), (true, false), (false, true), (true, true)]
                .into_iter()
                .enumerate()
        {
            let mut cell = Cell::new(&row, col).unwrap();
            cell.set_int(col as i64 * 10);
            if with_style {
                let mut style = border_style();
                style.font.bold = true;
                style.font.color = Some(Color(0xFF00_00FF));
                cell.set_style(style);
            }
            if with_validation {
                let mut dv = drop_list_validation();
                dv.set_error(DataValidationErrorStyle::Warning, Some("oops"), None);
                cell.set_data_validation(dv);
            }
            store.write_cell(&cell).unwrap();
            cells.push(cell);
        }

        for cell in &cells {
            let read = store.read_cell(&cell.key()).unwrap();
            assert_eq!(&read, cell, "{:?} col {}", kind, cell.col());
            assert_eq!(read.kind(), CellKind::Numeric);
        }
        store.close().unwrap();
    }
}

#[test]
fn test_overwrite_clears_unset_parts() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 0).unwrap();
        let mut cell = string_cell(&row, 0, "styled");
        cell.set_style(border_style());
        cell.set_data_validation(drop_list_validation());
        store.write_cell(&cell).unwrap();

        let plain = string_cell(&row, 0, "plain");
        store.write_cell(&plain).unwrap();

        let read = store.read_cell(&plain.key()).unwrap();
        assert_eq!(read.value(), "plain", "{:?}", kind);
        assert_eq!(read.style(), None, "{:?}", kind);
        assert_eq!(read.data_validation(), None, "{:?}", kind);
        store.close().unwrap();
    }
}

#[test]
fn test_idempotent_write() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 2).unwrap();
        let mut cell = string_cell(&row, 3, "twice");
        cell.set_style(border_style());

        store.write_cell(&cell).unwrap();
        let once = store.read_cell(&cell.key()).unwrap();
        store.write_cell(&cell).unwrap();
        let twice = store.read_cell(&cell.key()).unwrap();

        assert_eq!(once, twice, "{:?}", kind);
        assert_eq!(visited_cols(store.as_mut(), &row), vec![3], "{:?}", kind);
        store.close().unwrap();
    }
}

// =============================================================================
// Not-found Tests
// =============================================================================

#[test]
fn test_read_never_written_is_not_found() {
    for (kind, _temp, mut store) in backends() {
        let err = store.read_cell("S1:000000:000000").unwrap_err();
        assert!(err.is_not_found(), "{:?}: {:?}", kind, err);
        match err {
            CellStoreError::CellNotFound { key, .. } => assert_eq!(key, "S1:000000:000000"),
            other => panic!("{:?}: unexpected error {:?}", kind, other),
        }
        store.close().unwrap();
    }
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_for_each_in_row_visits_in_column_order() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 1).unwrap();
        for col in [7usize, 2, 0, 5, 1] {
            store.write_cell(&string_cell(&row, col, &format!("c{}", col))).unwrap();
        }

        let mut seen = Vec::new();
        store
            .for_each_in_row(&row, &mut |cell: Cell| {
                seen.push((cell.col(), cell.value().to_string()));
                Ok(())
            })
            .unwrap();

        let expected: Vec<(usize, String)> = [0usize, 1, 2, 5, 7]
            .into_iter()
            .map(|c| (c, format!("c{}", c)))
            .collect();
        assert_eq!(seen, expected, "{:?}", kind);
        store.close().unwrap();
    }
}

#[test]
fn test_for_each_in_row_is_scoped_to_the_row() {
    for (kind, _temp, mut store) in backends() {
        let row0 = Row::new("S1", 0).unwrap();
        let row1 = Row::new("S1", 1).unwrap();
        let row10 = Row::new("S1", 10).unwrap();
        let other_sheet = Row::new("S2", 1).unwrap();

        store.write_cell(&string_cell(&row0, 0, "r0")).unwrap();
        store.write_cell(&string_cell(&row1, 4, "r1")).unwrap();
        store.write_cell(&string_cell(&row10, 0, "r10")).unwrap();
        store.write_cell(&string_cell(&other_sheet, 2, "s2")).unwrap();

        assert_eq!(visited_cols(store.as_mut(), &row1), vec![4], "{:?}", kind);
        assert_eq!(visited_cols(store.as_mut(), &other_sheet), vec![2], "{:?}", kind);
        assert!(visited_cols(store.as_mut(), &Row::new("S1", 5).unwrap()).is_empty());
        store.close().unwrap();
    }
}

#[test]
fn test_separator_in_sheet_name_cannot_reach_another_row() {
    assert!(matches!(
        Row::new("A:000001", 0),
        Err(CellStoreError::InvalidSheetName { .. })
    ));
    assert!(matches!(
        key::cell_key("A:000001", 0, 0),
        Err(CellStoreError::InvalidSheetName { .. })
    ));
    assert!(key::row_prefix("", 0).is_err());

    for (kind, _temp, mut store) in backends() {
        let row_a1 = Row::new("A", 1).unwrap();
        let row_a10 = Row::new("A", 10).unwrap();
        let row_ab1 = Row::new("AB", 1).unwrap();
        store.write_cell(&string_cell(&row_a1, 3, "mine")).unwrap();
        store.write_cell(&string_cell(&row_a10, 0, "row 10")).unwrap();
        store.write_cell(&string_cell(&row_ab1, 0, "other sheet")).unwrap();

        let mut seen = Vec::new();
        row_a1
            .for_each_cell(store.as_mut(), |cell| {
                seen.push((cell.sheet_name().to_string(), cell.row_num(), cell.col()));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![("A".to_string(), 1, 3)], "{:?}", kind);
        store.close().unwrap();
    }
}

#[test]
fn test_visitor_error_aborts_and_propagates() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 0).unwrap();
        for col in 0..4 {
            store.write_cell(&string_cell(&row, col, "x")).unwrap();
        }

        let mut visits = 0;
        let result = store.for_each_in_row(&row, &mut |cell: Cell| {
            visits += 1;
            if cell.col() == 1 {
                return Err(CellStoreError::visitor(Stop(cell.col())));
            }
            Ok(())
        });

        assert_eq!(visits, 2, "{:?}", kind);
        match result {
            Err(CellStoreError::Visitor(inner)) => {
                let stop = inner.downcast_ref::<Stop>().expect("visitor error type preserved");
                assert_eq!(stop.0, 1);
            }
            other => panic!("{:?}: expected visitor error, got {:?}", kind, other),
        }
        store.close().unwrap();
    }
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_visibility() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 0).unwrap();
        let mut doomed = string_cell(&row, 1, "doomed");
        doomed.set_style(border_style());
        store.write_cell(&string_cell(&row, 0, "keep")).unwrap();
        store.write_cell(&doomed).unwrap();

        store.delete_cell(&doomed.key()).unwrap();

        assert!(store.read_cell(&doomed.key()).unwrap_err().is_not_found(), "{:?}", kind);
        assert_eq!(visited_cols(store.as_mut(), &row), vec![0], "{:?}", kind);
        assert_eq!(store.read_cell(&row.cell_key(0).unwrap()).unwrap().value(), "keep");
        store.close().unwrap();
    }
}

#[test]
fn test_delete_last_cell_of_row() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 3).unwrap();
        let cell = string_cell(&row, 0, "only");
        store.write_cell(&cell).unwrap();
        store.delete_cell(&cell.key()).unwrap();

        assert!(visited_cols(store.as_mut(), &row).is_empty(), "{:?}", kind);

        // The row is usable again afterwards.
        store.write_cell(&string_cell(&row, 2, "again")).unwrap();
        assert_eq!(visited_cols(store.as_mut(), &row), vec![2], "{:?}", kind);
        store.close().unwrap();
    }
}

#[test]
fn test_delete_missing_key_is_not_an_error() {
    for (kind, _temp, mut store) in backends() {
        store.delete_cell("S1:000000:000000").unwrap();
        store.delete_cell("S1:000009:000009").unwrap();
        assert!(store.read_cell("S1:000000:000000").unwrap_err().is_not_found(), "{:?}", kind);
        store.close().unwrap();
    }
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_styled_and_plain_cells_in_one_row() {
    for (kind, _temp, mut store) in backends() {
        let row = Row::new("S1", 0).unwrap();

        let mut first = string_cell(&row, 0, "A cell!");
        first.set_style(border_style());
        store.write_cell(&first).unwrap();

        let read = store.read_cell(&row.cell_key(0).unwrap()).unwrap();
        assert_eq!(read.value(), "A cell!");
        assert_eq!(read.style(), Some(&border_style()));

        store.write_cell(&string_cell(&row, 1, "second")).unwrap();

        let mut visits = Vec::new();
        store
            .for_each_in_row(&row, &mut |cell: Cell| {
                visits.push((cell.col(), cell.value().to_string(), cell.style().is_some()));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            visits,
            vec![
                (0, "A cell!".to_string(), true),
                (1, "second".to_string(), false),
            ],
            "{:?}",
            kind
        );
        store.close().unwrap();
    }
}
