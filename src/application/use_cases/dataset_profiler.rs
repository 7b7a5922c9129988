// ============================================================
// DATASET PROFILER
// ============================================================
// Per-column statistics and the plain-text summary shown after upload

use crate::domain::dataset::{format_number, round4, Column, Table};
use crate::domain::profile::{ColumnProfile, ColumnStats, DatasetProfile};

/// Number of frequent values kept for categorical columns
const TOP_VALUES: usize = 3;

/// Compute the profile of a freshly loaded table
pub fn profile(table: &Table) -> DatasetProfile {
    DatasetProfile {
        rows: table.row_count(),
        columns: table.column_count(),
        column_details: table.columns().iter().map(profile_column).collect(),
    }
}

fn profile_column(column: &Column) -> ColumnProfile {
    let stats = if column.is_numeric() {
        ColumnStats::Numeric {
            mean: column.mean().map(round4),
            median: column.median().map(round4),
            min: column.min().map(round4),
            max: column.max().map(round4),
        }
    } else {
        ColumnStats::Categorical {
            top_values: column
                .value_counts()
                .into_iter()
                .take(TOP_VALUES)
                .map(|(value, _)| value)
                .collect(),
        }
    };

    ColumnProfile {
        name: column.name().to_string(),
        dtype: column.kind(),
        missing: column.missing_count(),
        unique: column.unique_count(),
        stats,
    }
}

/// Human-readable rendering of a profile.
///
/// ```text
/// Rows: 3, Columns: 2
/// Columns:
/// - age (numeric) | mean=33.3333 median=30
/// - city (categorical) | top values: NYC, LA
/// ```
pub fn render_text(profile: &DatasetProfile) -> String {
    let mut lines = vec![
        format!("Rows: {}, Columns: {}", profile.rows, profile.columns),
        "Columns:".to_string(),
    ];

    for column in &profile.column_details {
        let mut line = format!("- {} ({})", column.name, column.dtype);

        if let (Some(mean), Some(median)) = (column.mean(), column.median()) {
            line.push_str(&format!(
                " | mean={} median={}",
                format_number(mean),
                format_number(median)
            ));
        }

        let top_values = column.top_values();
        if !top_values.is_empty() {
            line.push_str(&format!(" | top values: {}", top_values.join(", ")));
        }

        if column.missing > 0 {
            line.push_str(&format!(" | missing={}", column.missing));
        }

        lines.push(line);
    }

    lines.join("\n")
}
