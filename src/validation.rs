//! Data-validation rules attached to cells
//!
//! The storage layer persists these verbatim; evaluating a rule against a
//! value belongs to the document layer.

use serde::{Deserialize, Serialize};

use crate::error::{CellStoreError, Result};

/// Longest formula a validation rule may carry (spreadsheet limit)
pub const MAX_FORMULA_LEN: usize = 255;

/// What kind of value the rule accepts
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataValidationKind {
    #[default]
    Any,
    Whole,
    Decimal,
    List,
    Date,
    Time,
    TextLength,
    Custom,
}

/// Comparison applied to `formula1`/`formula2`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataValidationOperator {
    Between,
    NotBetween,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// How an invalid entry is reported
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataValidationErrorStyle {
    #[default]
    Stop,
    Warning,
    Information,
}

/// Prompt shown when the cell is selected
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataValidationInputMessage {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Alert shown when an invalid value is entered
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataValidationErrorAlert {
    pub style: DataValidationErrorStyle,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Zero-based inclusive cell range a rule applies to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CellRange {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl CellRange {
    pub fn new(first_row: usize, first_col: usize, last_row: usize, last_col: usize) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }
}

/// A data-validation rule
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct DataValidation {
    pub range: CellRange,
    pub kind: DataValidationKind,
    pub operator: Option<DataValidationOperator>,
    pub formula1: String,
    pub formula2: Option<String>,
    pub allow_blank: bool,
    pub show_drop_down: bool,
    pub show_input_message: bool,
    pub show_error_message: bool,
    pub input_message: Option<DataValidationInputMessage>,
    pub error_alert: Option<DataValidationErrorAlert>,
}

impl DataValidation {
    /// An unrestricted rule over `range`
    pub fn new(range: CellRange, allow_blank: bool) -> Self {
        Self {
            range,
            allow_blank,
            ..Self::default()
        }
    }

    /// Restrict the cell to one of `items`, offered as a drop-down
    ///
    /// Fails if the inline list formula would exceed [`MAX_FORMULA_LEN`].
    pub fn set_drop_list<S: AsRef<str>>(&mut self, items: &[S]) -> Result<()> {
        let joined = items
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        let formula = format!("\"{}\"", joined);
        if formula.len() > MAX_FORMULA_LEN {
            return Err(CellStoreError::Validation(format!(
                "drop list formula is {} characters, limit is {}",
                formula.len(),
                MAX_FORMULA_LEN
            )));
        }
        self.kind = DataValidationKind::List;
        self.operator = None;
        self.formula1 = formula;
        self.formula2 = None;
        self.show_drop_down = true;
        Ok(())
    }

    /// Restrict to a comparison on numbers, dates, or text lengths
    pub fn set_range_rule(
        &mut self,
        kind: DataValidationKind,
        operator: DataValidationOperator,
        formula1: impl Into<String>,
        formula2: Option<String>,
    ) -> Result<()> {
        let formula1 = formula1.into();
        if formula1.len() > MAX_FORMULA_LEN
            || formula2.as_ref().is_some_and(|f| f.len() > MAX_FORMULA_LEN)
        {
            return Err(CellStoreError::Validation(format!(
                "formula exceeds {} characters",
                MAX_FORMULA_LEN
            )));
        }
        let needs_second = matches!(
            operator,
            DataValidationOperator::Between | DataValidationOperator::NotBetween
        );
        if needs_second != formula2.is_some() {
            return Err(CellStoreError::Validation(format!(
                "operator {:?} {} a second formula",
                operator,
                if needs_second { "requires" } else { "does not take" }
            )));
        }
        self.kind = kind;
        self.operator = Some(operator);
        self.formula1 = formula1;
        self.formula2 = formula2;
        Ok(())
    }

    /// Show an input prompt when the cell is selected
    pub fn set_input(&mut self, title: Option<&str>, body: Option<&str>) {
        self.show_input_message = true;
        self.input_message = Some(DataValidationInputMessage {
            title: title.map(str::to_string),
            body: body.map(str::to_string),
        });
    }

    /// Show an alert when an invalid value is entered
    pub fn set_error(
        &mut self,
        style: DataValidationErrorStyle,
        title: Option<&str>,
        body: Option<&str>,
    ) {
        self.show_error_message = true;
        self.error_alert = Some(DataValidationErrorAlert {
            style,
            title: title.map(str::to_string),
            body: body.map(str::to_string),
        });
    }
}
