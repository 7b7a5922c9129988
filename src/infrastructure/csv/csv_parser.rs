// ============================================================
// CSV PARSER
// ============================================================
// Parse CSV files into a typed table with encoding fallback

use crate::domain::dataset::{Column, Table};
use crate::domain::error::{AppError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use std::path::Path;

/// Comma-separated parser producing a [`Table`]
#[derive(Debug, Default)]
pub struct CsvParser;

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CSV file into a table
    pub fn parse_file(&self, path: &Path) -> Result<Table> {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::IoError(format!("Failed to read file: {}", e)))?;
        let content = decode(&bytes);
        self.parse_content(&content)
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true) // short rows are padded with missing values below
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        if headers.is_empty() {
            return Err(AppError::ParseError(
                "No columns to parse from file".to_string(),
            ));
        }

        let names = normalize_headers(&headers);
        let mut values: Vec<Vec<String>> = vec![Vec::new(); names.len()];

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            self.push_record(index, &record, &mut values)?;
        }

        let columns = names
            .into_iter()
            .zip(values)
            .map(|(name, column_values)| Column::from_raw(name, column_values))
            .collect();

        Table::new(columns)
    }

    /// Append one record to the per-column buffers
    fn push_record(
        &self,
        index: usize,
        record: &StringRecord,
        values: &mut [Vec<String>],
    ) -> Result<()> {
        if record.len() > values.len() {
            return Err(AppError::ParseError(format!(
                "Expected {} fields in row {}, saw {}",
                values.len(),
                index + 1,
                record.len()
            )));
        }

        for (idx, column) in values.iter_mut().enumerate() {
            column.push(record.get(idx).unwrap_or("").to_string());
        }

        Ok(())
    }
}

/// Decode file bytes: UTF-8 (BOM stripped) first, Windows-1252 otherwise
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            content.into_owned()
        }
    }
}

/// Name blank headers `Unnamed: {index}` and suffix repeats with `.1`, `.2`, ...
fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());

    for (idx, header) in headers.iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        seen.insert(name.clone());
        names.push(name);
    }

    names
}
