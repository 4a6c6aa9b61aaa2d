//! Tests for the key codec
//!
//! These tests verify:
//! - Fixed-width key and row-prefix formatting
//! - Lexicographic order equals column order within a row
//! - Parsing keys back to coordinates (and rejecting sidecar keys)
//! - Overflow of the field width is reported, not silently accepted

use cellstore::key::{
    cell_key, parse_cell_key, row_prefix, row_prefix_of, row_scan_prefix, CellCoord, MAX_INDEX,
};
use cellstore::CellStoreError;

// =============================================================================
// Formatting Tests
// =============================================================================

#[test]
fn test_cell_key_format() {
    assert_eq!(cell_key("Sheet1", 0, 0).unwrap(), "Sheet1:000000:000000");
    assert_eq!(cell_key("Sheet1", 12, 3).unwrap(), "Sheet1:000012:000003");
    assert_eq!(
        cell_key("Data", MAX_INDEX, MAX_INDEX).unwrap(),
        "Data:999999:999999"
    );
}

#[test]
fn test_row_prefix_format() {
    assert_eq!(row_prefix("Sheet1", 7).unwrap(), "Sheet1:000007");
    assert_eq!(row_scan_prefix("Sheet1:000007"), "Sheet1:000007:");
}

#[test]
fn test_key_is_stable() {
    let a = cell_key("S1", 42, 9).unwrap();
    let b = cell_key("S1", 42, 9).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_different_sheets_never_collide() {
    assert_ne!(cell_key("S1", 1, 1).unwrap(), cell_key("S2", 1, 1).unwrap());
    assert_ne!(cell_key("S", 11, 1).unwrap(), cell_key("S1", 1, 1).unwrap());
}

#[test]
fn test_row_prefix_matches_cell_keys_of_that_row_only() {
    let prefix = row_scan_prefix(&row_prefix("S1", 1).unwrap());
    assert!(cell_key("S1", 1, 0).unwrap().starts_with(&prefix));
    assert!(cell_key("S1", 1, 999).unwrap().starts_with(&prefix));
    assert!(!cell_key("S1", 10, 0).unwrap().starts_with(&prefix));
    assert!(!cell_key("S1", 0, 1).unwrap().starts_with(&prefix));
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_lexicographic_order_equals_column_order() {
    let cols = [0usize, 1, 2, 9, 10, 11, 99, 100, 1_000, 54_321, MAX_INDEX];
    let mut keys: Vec<String> = cols
        .iter()
        .rev()
        .map(|&c| cell_key("S1", 3, c).unwrap())
        .collect();
    keys.sort();

    let decoded: Vec<usize> = keys.iter().map(|k| parse_cell_key(k).unwrap().col).collect();
    assert_eq!(decoded, cols.to_vec());
}

#[test]
fn test_rows_sort_before_later_rows() {
    let mut keys = vec![
        cell_key("S1", 2, 0).unwrap(),
        cell_key("S1", 1, 500).unwrap(),
        cell_key("S1", 10, 0).unwrap(),
    ];
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "S1:000001:000500".to_string(),
            "S1:000002:000000".to_string(),
            "S1:000010:000000".to_string(),
        ]
    );
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_cell_key() {
    assert_eq!(
        parse_cell_key("My Sheet:000004:000017"),
        Some(CellCoord {
            sheet: "My Sheet".to_string(),
            row: 4,
            col: 17,
        })
    );
}

#[test]
fn test_parse_rejects_non_cell_keys() {
    assert_eq!(parse_cell_key("S1:000000:000000#style"), None);
    assert_eq!(parse_cell_key("S1:000000"), None);
    assert_eq!(parse_cell_key("S1:0:0"), None);
    assert_eq!(parse_cell_key(":000000:000000"), None);
    assert_eq!(parse_cell_key("garbage"), None);
}

#[test]
fn test_row_prefix_of_key() {
    assert_eq!(row_prefix_of("S1:000003:000004").unwrap(), "S1:000003");
    assert!(matches!(
        row_prefix_of("no-separators"),
        Err(CellStoreError::InvalidKey(_))
    ));
}

// =============================================================================
// Overflow Tests
// =============================================================================

#[test]
fn test_row_overflow_is_rejected() {
    let err = cell_key("S1", MAX_INDEX + 1, 0).unwrap_err();
    assert!(matches!(err, CellStoreError::KeyOverflow { index } if index == MAX_INDEX + 1));
}

#[test]
fn test_col_overflow_is_rejected() {
    assert!(matches!(
        cell_key("S1", 0, 1_000_000),
        Err(CellStoreError::KeyOverflow { .. })
    ));
    assert!(matches!(
        row_prefix("S1", usize::MAX),
        Err(CellStoreError::KeyOverflow { .. })
    ));
}
