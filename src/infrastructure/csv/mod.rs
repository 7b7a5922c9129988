// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV parsing with encoding fallback and header normalization

mod csv_parser;

pub use csv_parser::CsvParser;
