use crate::domain::dataset::Table;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::excel::read_workbook;
use std::path::Path;

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Excel,
}

impl TabularFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(TabularFormat::Csv),
            Some("xlsx") | Some("xls") => Ok(TabularFormat::Excel),
            _ => Err(AppError::UnsupportedFormat(
                "Unsupported file type. Please upload CSV or Excel files.".to_string(),
            )),
        }
    }
}

/// Load a CSV or Excel file into a table
pub fn load(path: &Path) -> Result<Table> {
    match TabularFormat::from_path(path)? {
        TabularFormat::Csv => CsvParser::new().parse_file(path),
        TabularFormat::Excel => read_workbook(path),
    }
}
