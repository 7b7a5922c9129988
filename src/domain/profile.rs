// ============================================================
// DATASET PROFILE
// ============================================================
// Per-column summary computed once per upload

use super::dataset::ColumnKind;
use serde::Serialize;

/// Kind-specific column statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnStats {
    /// Rounded to 4 decimals; all `None` when the column has no values
    Numeric {
        mean: Option<f64>,
        median: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Up to three most frequent values
    Categorical { top_values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: ColumnKind,
    pub missing: usize,
    pub unique: usize,
    #[serde(flatten)]
    pub stats: ColumnStats,
}

impl ColumnProfile {
    pub fn mean(&self) -> Option<f64> {
        match self.stats {
            ColumnStats::Numeric { mean, .. } => mean,
            ColumnStats::Categorical { .. } => None,
        }
    }

    pub fn median(&self) -> Option<f64> {
        match self.stats {
            ColumnStats::Numeric { median, .. } => median,
            ColumnStats::Categorical { .. } => None,
        }
    }

    pub fn top_values(&self) -> &[String] {
        match &self.stats {
            ColumnStats::Categorical { top_values } => top_values,
            ColumnStats::Numeric { .. } => &[],
        }
    }
}

/// Immutable summary of an uploaded table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    pub column_details: Vec<ColumnProfile>,
}
