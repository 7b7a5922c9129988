// ============================================================
// EXCEL READER
// ============================================================
// First worksheet of an .xlsx / .xls workbook as a typed table

use crate::domain::dataset::{is_missing_marker, Cell, Column, Table};
use crate::domain::error::{AppError, Result};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use chrono::NaiveTime;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Read the first worksheet; the first row holds the headers
pub fn read_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::ParseError(format!("Failed to open Excel file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
        .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?;

    let table = range_to_table(&range)?;
    debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        "Excel worksheet loaded"
    );
    Ok(table)
}

fn range_to_table(range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| AppError::ParseError("Worksheet is empty".to_string()))?;

    let names = header_names(header_row);
    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];

    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).map(to_cell).unwrap_or(Cell::Missing));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, column_cells)| Column::new(name, column_cells))
        .collect();

    Table::new(columns)
}

fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell {
                Data::Empty => format!("Unnamed: {}", idx),
                other => other.to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) if value.is_nan() => Cell::Missing,
        Data::Float(value) => Cell::Number(*value),
        Data::String(text) if is_missing_marker(text) => Cell::Missing,
        Data::String(text) => Cell::Text(text.trim().to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(moment) if moment.time() == NaiveTime::MIN => {
                Cell::Text(moment.date().to_string())
            }
            Some(moment) => Cell::Text(moment.to_string()),
            None => Cell::Text(cell.to_string()),
        },
        Data::Empty | Data::Error(_) => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}
