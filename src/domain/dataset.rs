// ============================================================
// DATASET TYPES
// ============================================================
// In-memory table built from an uploaded CSV or Excel file

use super::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tokens read as missing values, on top of the empty string
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw text value stands for a missing cell
pub fn is_missing_marker(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

/// Round to 4 decimal places
pub fn round4(value: f64) -> f64 {
    // `+ 0.0` folds -0.0 into 0.0 so it never renders as "-0"
    (value * 10_000.0).round() / 10_000.0 + 0.0
}

/// Render a number the way answers and summaries show it: rounded to 4
/// decimals, no trailing zeros, integral values without a decimal point.
pub fn format_number(value: f64) -> String {
    format!("{}", round4(value))
}

/// Shortest text that reads back as the same value; `-0` folds into `0`
fn exact_label(value: f64) -> String {
    (value + 0.0).to_string()
}

/// Finite number parsed from a raw cell; `NaN` and infinities are rejected
fn parse_finite(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// A single typed cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Exact string form used for value counting and display; `None` for missing cells
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Number(value) => Some(exact_label(*value)),
            Cell::Text(text) => Some(text.clone()),
            Cell::Missing => None,
        }
    }
}

/// A named column of cells
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    cells: Vec<Cell>,
}

impl Column {
    /// Build a column from typed cells (Excel path).
    ///
    /// If any cell holds text the column is categorical and its numeric cells
    /// are converted to their text form.
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let has_text = cells.iter().any(|cell| matches!(cell, Cell::Text(_)));
        if !has_text {
            return Self {
                name: name.into(),
                kind: ColumnKind::Numeric,
                cells,
            };
        }

        let cells = cells
            .into_iter()
            .map(|cell| match cell {
                Cell::Number(value) => Cell::Text(exact_label(value)),
                other => other,
            })
            .collect();

        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
            cells,
        }
    }

    /// Build a column from raw text values (CSV path).
    ///
    /// The column is numeric when every non-missing value parses as a number;
    /// otherwise every non-missing value keeps its original text.
    pub fn from_raw(name: impl Into<String>, values: Vec<String>) -> Self {
        let numeric = values
            .iter()
            .filter(|value| !is_missing_marker(value))
            .all(|value| parse_finite(value).is_some());

        let cells = values
            .into_iter()
            .map(|value| {
                if is_missing_marker(&value) {
                    Cell::Missing
                } else if numeric {
                    parse_finite(&value).map(Cell::Number).unwrap_or(Cell::Missing)
                } else {
                    Cell::Text(value)
                }
            })
            .collect();

        Self {
            name: name.into(),
            kind: if numeric {
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            },
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_missing()).count()
    }

    pub fn non_missing(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| !cell.is_missing())
    }

    pub fn has_values(&self) -> bool {
        self.non_missing().next().is_some()
    }

    /// Non-missing numeric values in row order
    pub fn numbers(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::as_number).collect()
    }

    /// Distinct non-missing values with their counts, most frequent first.
    /// Ties keep first-encountered order.
    pub fn value_counts(&self) -> Vec<(String, usize)> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for label in self.cells.iter().filter_map(Cell::label) {
            match positions.get(&label) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    positions.insert(label.clone(), counts.len());
                    counts.push((label, 1));
                }
            }
        }

        // stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn unique_count(&self) -> usize {
        self.value_counts().len()
    }

    pub fn sum(&self) -> Option<f64> {
        let values = self.numeric_values()?;
        Some(values.iter().sum())
    }

    pub fn mean(&self) -> Option<f64> {
        let values = self.numeric_values()?;
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn median(&self) -> Option<f64> {
        let mut values = self.numeric_values()?;
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            Some((values[mid - 1] + values[mid]) / 2.0)
        } else {
            Some(values[mid])
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.numeric_values()?.into_iter().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.numeric_values()?.into_iter().reduce(f64::max)
    }

    /// Numbers of a numeric column with at least one value
    fn numeric_values(&self) -> Option<Vec<f64>> {
        if !self.is_numeric() {
            return None;
        }
        let values = self.numbers();
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }
}

/// Ordered collection of equally long columns
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting columns of unequal length
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|column| column.len() != expected) {
                return Err(AppError::ParseError(format!(
                    "Column '{}' has {} rows, expected {}",
                    bad.name(),
                    bad.len(),
                    expected
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
