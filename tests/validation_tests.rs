//! Tests for DataValidation and Style helpers
//!
//! These tests verify:
//! - Drop lists build an inline list formula and honour the length limit
//! - Range rules demand a second formula exactly for (not-)between
//! - Rules attached to a cell survive the disk backend

use cellstore::validation::{
    CellRange, DataValidationErrorStyle, DataValidationKind, DataValidationOperator,
    MAX_FORMULA_LEN,
};
use cellstore::{
    BorderStyle, Cell, CellStore, CellStoreError, Config, DataValidation, DiskCellStore, Row,
};
use tempfile::TempDir;

// =============================================================================
// Drop List Tests
// =============================================================================

#[test]
fn test_drop_list_formula() {
    let mut dv = DataValidation::new(CellRange::new(0, 0, 9, 0), true);
    dv.set_drop_list(&["red", "green", "blue"]).unwrap();

    assert_eq!(dv.kind, DataValidationKind::List);
    assert_eq!(dv.formula1, "\"red,green,blue\"");
    assert!(dv.show_drop_down);
    assert!(dv.allow_blank);
}

#[test]
fn test_drop_list_too_long_is_rejected() {
    let mut dv = DataValidation::new(CellRange::default(), false);
    let items: Vec<String> = (0..100).map(|i| format!("item{}", i)).collect();

    assert!(matches!(
        dv.set_drop_list(&items),
        Err(CellStoreError::Validation(_))
    ));
    // Rule left untouched on failure.
    assert_eq!(dv.kind, DataValidationKind::Any);
    assert!(dv.formula1.is_empty());
}

#[test]
fn test_drop_list_at_exact_limit() {
    let mut dv = DataValidation::new(CellRange::default(), false);
    let item = "x".repeat(MAX_FORMULA_LEN - 2);
    dv.set_drop_list(&[item.as_str()]).unwrap();
    assert_eq!(dv.formula1.len(), MAX_FORMULA_LEN);
}

// =============================================================================
// Range Rule Tests
// =============================================================================

#[test]
fn test_range_rule_between_needs_second_formula() {
    let mut dv = DataValidation::new(CellRange::default(), false);

    assert!(dv
        .set_range_rule(
            DataValidationKind::Whole,
            DataValidationOperator::Between,
            "1",
            None
        )
        .is_err());
    dv.set_range_rule(
        DataValidationKind::Whole,
        DataValidationOperator::Between,
        "1",
        Some("10".to_string()),
    )
    .unwrap();

    assert_eq!(dv.operator, Some(DataValidationOperator::Between));
    assert_eq!(dv.formula2.as_deref(), Some("10"));
}

#[test]
fn test_range_rule_single_operand_rejects_second_formula() {
    let mut dv = DataValidation::new(CellRange::default(), false);
    assert!(matches!(
        dv.set_range_rule(
            DataValidationKind::Decimal,
            DataValidationOperator::GreaterThan,
            "0.5",
            Some("2".to_string()),
        ),
        Err(CellStoreError::Validation(_))
    ));
    dv.set_range_rule(
        DataValidationKind::Decimal,
        DataValidationOperator::GreaterThan,
        "0.5",
        None,
    )
    .unwrap();
    assert_eq!(dv.kind, DataValidationKind::Decimal);
}

#[test]
fn test_cell_range_contains() {
    let range = CellRange::new(2, 1, 4, 3);
    assert!(range.contains(2, 1));
    assert!(range.contains(4, 3));
    assert!(!range.contains(5, 2));
    assert!(!range.contains(3, 0));
}

#[test]
fn test_border_style_names() {
    assert_eq!(BorderStyle::from_name("medium"), Some(BorderStyle::Medium));
    assert_eq!(BorderStyle::from_name(""), Some(BorderStyle::None));
    assert_eq!(BorderStyle::from_name("wavy"), None);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_rule_with_messages_survives_disk_backend() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().temp_root(temp.path()).build();
    let mut store = DiskCellStore::open(&config).unwrap();

    let row = Row::new("Sheet1", 1).unwrap();
    let mut dv = DataValidation::new(CellRange::new(1, 0, 1, 0), false);
    dv.set_drop_list(&["yes", "no"]).unwrap();
    dv.set_input(Some("Answer"), Some("Pick one"));
    dv.set_error(DataValidationErrorStyle::Warning, None, Some("Invalid answer"));

    let mut cell = Cell::new(&row, 0).unwrap();
    cell.set_string("yes");
    cell.set_data_validation(dv.clone());
    store.write_cell(&cell).unwrap();
    store.engine().flush().unwrap();

    let read = store.read_cell(&cell.key()).unwrap();
    assert_eq!(read.data_validation(), Some(&dv));
    assert_eq!(read.style(), None);
}
