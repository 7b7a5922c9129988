//! Dataset Question Answering
//!
//! Answers simple statistical questions about the uploaded table using an
//! ordered table of keyword intents. The first intent whose trigger matches
//! the question handles it, even when later intents would also match:
//! - "columns" / "fields" / "headers" → list the column names
//! - "rows" / "records" / "entries" → row and column counts
//! - anything else → resolve a target column, then an ordered table of
//!   per-column statistics (average, median, total, min, max, unique,
//!   missing, most common)
//!
//! `None` means no intent produced an answer and the caller should fall back
//! to the knowledge base.

use crate::application::use_cases::dataset_profiler::render_text;
use crate::domain::dataset::{format_number, Column, Table};
use crate::domain::profile::DatasetProfile;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z0-9_]+").unwrap());

/// Number of values listed by the most-common intent
const MOST_COMMON_LIMIT: usize = 3;

const SUMMARY_KEYWORDS: &[&str] = &["summary", "describe", "overview", "profile"];

/// When an intent fires
enum Trigger {
    /// Always evaluated
    Always,
    /// Any phrase appears as a substring, or any word appears as a whole token
    Keywords {
        phrases: &'static [&'static str],
        words: &'static [&'static str],
    },
}

impl Trigger {
    const fn phrases(phrases: &'static [&'static str]) -> Self {
        Trigger::Keywords { phrases, words: &[] }
    }

    fn matches(&self, question: &Question<'_>) -> bool {
        match self {
            Trigger::Always => true,
            Trigger::Keywords { phrases, words } => {
                phrases.iter().any(|phrase| question.lower.contains(phrase))
                    || words.iter().any(|word| question.tokens.contains(*word))
            }
        }
    }
}

/// Question text prepared once for every intent
struct Question<'a> {
    lower: String,
    tokens: HashSet<String>,
    table: &'a Table,
    profile: &'a DatasetProfile,
}

impl<'a> Question<'a> {
    fn new(text: &str, table: &'a Table, profile: &'a DatasetProfile) -> Self {
        let lower = text.to_lowercase();
        let tokens = tokenize(&lower);
        Self {
            lower,
            tokens,
            table,
            profile,
        }
    }
}

/// Dataset-level intent
struct Intent {
    name: &'static str,
    trigger: Trigger,
    respond: fn(&Question<'_>) -> Option<String>,
}

/// Column-level statistic
struct StatIntent {
    name: &'static str,
    trigger: Trigger,
    /// Reply for non-numeric columns; `None` when the statistic applies to any column
    not_numeric: Option<fn(&str) -> String>,
    compute: fn(&Column) -> Option<String>,
}

const DATASET_INTENTS: &[Intent] = &[
    Intent {
        name: "column_list",
        trigger: Trigger::phrases(&["column names", "columns", "fields", "headers"]),
        respond: list_columns,
    },
    Intent {
        name: "row_count",
        trigger: Trigger::phrases(&["row count", "rows", "records", "entries"]),
        respond: count_rows,
    },
    Intent {
        name: "column_stats",
        trigger: Trigger::Always,
        respond: column_stats,
    },
];

const STAT_INTENTS: &[StatIntent] = &[
    StatIntent {
        name: "average",
        trigger: Trigger::phrases(&["average", "mean"]),
        not_numeric: Some(|c| {
            format!("The column '{c}' is not numeric, so an average is not applicable.")
        }),
        compute: |column| {
            Some(format!(
                "The average of '{}' is {}.",
                column.name(),
                format_number(column.mean()?)
            ))
        },
    },
    StatIntent {
        name: "median",
        trigger: Trigger::phrases(&["median"]),
        not_numeric: Some(|c| {
            format!("The column '{c}' is not numeric, so a median is not applicable.")
        }),
        compute: |column| {
            Some(format!(
                "The median of '{}' is {}.",
                column.name(),
                format_number(column.median()?)
            ))
        },
    },
    StatIntent {
        name: "sum",
        trigger: Trigger::phrases(&["sum", "total"]),
        not_numeric: Some(|c| format!("The column '{c}' is not numeric, so a sum is not applicable.")),
        compute: |column| {
            Some(format!(
                "The total of '{}' is {}.",
                column.name(),
                format_number(column.sum()?)
            ))
        },
    },
    StatIntent {
        name: "minimum",
        trigger: Trigger::phrases(&["minimum", "min", "lowest"]),
        not_numeric: Some(|c| format!("'{c}' is not numeric; minimum is not computed.")),
        compute: |column| {
            Some(format!(
                "The minimum of '{}' is {}.",
                column.name(),
                format_number(column.min()?)
            ))
        },
    },
    StatIntent {
        name: "maximum",
        trigger: Trigger::phrases(&["maximum", "max", "highest"]),
        not_numeric: Some(|c| format!("'{c}' is not numeric; maximum is not computed.")),
        compute: |column| {
            Some(format!(
                "The maximum of '{}' is {}.",
                column.name(),
                format_number(column.max()?)
            ))
        },
    },
    StatIntent {
        name: "unique",
        trigger: Trigger::phrases(&["unique", "distinct"]),
        not_numeric: None,
        compute: |column| {
            Some(format!(
                "'{}' has {} unique values.",
                column.name(),
                column.unique_count()
            ))
        },
    },
    StatIntent {
        name: "missing",
        trigger: Trigger::Keywords {
            phrases: &["missing", "null", "empty"],
            words: &["na"],
        },
        not_numeric: None,
        compute: |column| {
            Some(format!(
                "The column '{}' has {} missing values.",
                column.name(),
                column.missing_count()
            ))
        },
    },
    StatIntent {
        name: "most_common",
        trigger: Trigger::phrases(&["most common", "top value", "frequent"]),
        not_numeric: None,
        compute: |column| {
            let formatted = column
                .value_counts()
                .into_iter()
                .take(MOST_COMMON_LIMIT)
                .map(|(value, count)| format!("{} ({})", value, count))
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!(
                "The most common values in '{}' are: {}.",
                column.name(),
                formatted
            ))
        },
    },
];

/// Answer a question about a profiled table, or `None` when no intent matches
pub fn answer(question: &str, table: &Table, profile: &DatasetProfile) -> Option<String> {
    let question = Question::new(question, table, profile);

    let intent = DATASET_INTENTS
        .iter()
        .find(|intent| intent.trigger.matches(&question))?;
    tracing::debug!(intent = intent.name, "Dataset intent matched");
    (intent.respond)(&question)
}

/// Column mentioned by a question.
///
/// A column whose full name appears in the question wins; otherwise the first
/// column sharing a word token with the question.
pub fn find_column<'t>(question: &str, table: &'t Table) -> Option<&'t Column> {
    let lower = question.to_lowercase();
    resolve_column(&lower, &tokenize(&lower), table)
}

fn resolve_column<'t>(
    lower: &str,
    tokens: &HashSet<String>,
    table: &'t Table,
) -> Option<&'t Column> {
    table
        .columns()
        .iter()
        .find(|column| lower.contains(&column.name().to_lowercase()))
        .or_else(|| {
            table.columns().iter().find(|column| {
                tokenize(&column.name().to_lowercase())
                    .iter()
                    .any(|token| tokens.contains(token))
            })
        })
}

fn tokenize(text: &str) -> HashSet<String> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn list_columns(question: &Question<'_>) -> Option<String> {
    let names = question.table.column_names();
    Some(format!(
        "The dataset contains {} columns: {}.",
        names.len(),
        names.join(", ")
    ))
}

fn count_rows(question: &Question<'_>) -> Option<String> {
    Some(format!(
        "The dataset has {} rows and {} columns.",
        question.table.row_count(),
        question.table.column_count()
    ))
}

fn column_stats(question: &Question<'_>) -> Option<String> {
    let Some(column) = resolve_column(&question.lower, &question.tokens, question.table) else {
        let wants_summary = SUMMARY_KEYWORDS
            .iter()
            .any(|keyword| question.lower.contains(keyword));
        return wants_summary.then(|| render_text(question.profile));
    };

    if !column.has_values() {
        return Some(format!(
            "The column '{}' has only missing values.",
            column.name()
        ));
    }

    let stat = STAT_INTENTS
        .iter()
        .find(|stat| stat.trigger.matches(question))?;
    tracing::debug!(column = column.name(), stat = stat.name, "Column statistic matched");

    match stat.not_numeric {
        Some(not_numeric) if !column.is_numeric() => Some(not_numeric(column.name())),
        _ => (stat.compute)(column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::dataset_profiler::profile;
    use crate::infrastructure::csv::CsvParser;

    fn ask(content: &str, question: &str) -> Option<String> {
        let table = CsvParser::new().parse_content(content).unwrap();
        let profile = profile(&table);
        answer(question, &table, &profile)
    }

    const PEOPLE: &str = "age,city\n30,NYC\n40,LA\n30,NYC";

    #[test]
    fn test_average_of_resolved_column() {
        assert_eq!(
            ask(PEOPLE, "what is the average age?").as_deref(),
            Some("The average of 'age' is 33.3333.")
        );
    }

    #[test]
    fn test_row_count() {
        assert_eq!(
            ask(PEOPLE, "how many rows").as_deref(),
            Some("The dataset has 3 rows and 2 columns.")
        );
    }

    #[test]
    fn test_most_common_values() {
        assert_eq!(
            ask(PEOPLE, "most common city").as_deref(),
            Some("The most common values in 'city' are: NYC (2), LA (1).")
        );
    }

    #[test]
    fn test_column_listing_outranks_row_count() {
        assert_eq!(
            ask(PEOPLE, "how many rows and columns are there?").as_deref(),
            Some("The dataset contains 2 columns: age, city.")
        );
    }

    #[test]
    fn test_numeric_only_stat_on_categorical_column() {
        assert_eq!(
            ask(PEOPLE, "mean of city").as_deref(),
            Some("The column 'city' is not numeric, so an average is not applicable.")
        );
        assert_eq!(
            ask(PEOPLE, "lowest city").as_deref(),
            Some("'city' is not numeric; minimum is not computed.")
        );
    }

    #[test]
    fn test_stat_answers() {
        assert_eq!(
            ask(PEOPLE, "median age").as_deref(),
            Some("The median of 'age' is 30.")
        );
        assert_eq!(
            ask(PEOPLE, "total age").as_deref(),
            Some("The total of 'age' is 100.")
        );
        assert_eq!(
            ask(PEOPLE, "highest age").as_deref(),
            Some("The maximum of 'age' is 40.")
        );
        assert_eq!(
            ask(PEOPLE, "distinct city").as_deref(),
            Some("'city' has 2 unique values.")
        );
    }

    #[test]
    fn test_missing_count() {
        let content = "score,team\n1.5,a\n,b\n2,";
        assert_eq!(
            ask(content, "how many null score values").as_deref(),
            Some("The column 'score' has 1 missing values.")
        );
        assert_eq!(
            ask(content, "team na count").as_deref(),
            Some("The column 'team' has 1 missing values.")
        );
    }

    #[test]
    fn test_only_missing_values_short_circuits() {
        assert_eq!(
            ask("id,notes\n1,\n2,", "average notes").as_deref(),
            Some("The column 'notes' has only missing values.")
        );
    }

    #[test]
    fn test_distinct_and_most_common_count_exact_values() {
        let content = "price\n1.00001\n1.00002\n1.00003";
        assert_eq!(
            ask(content, "distinct price").as_deref(),
            Some("'price' has 3 unique values.")
        );
        assert_eq!(
            ask(content, "most common price").as_deref(),
            Some("The most common values in 'price' are: 1.00001 (1), 1.00002 (1), 1.00003 (1).")
        );
    }

    #[test]
    fn test_non_finite_values_are_not_averaged() {
        assert_eq!(
            ask("x\n1\nNAN\n3", "average x").as_deref(),
            Some("The column 'x' is not numeric, so an average is not applicable.")
        );
        assert_eq!(
            ask("x\n1\ninfinity\n3", "median x").as_deref(),
            Some("The column 'x' is not numeric, so a median is not applicable.")
        );
    }

    #[test]
    fn test_na_keyword_matches_whole_word_only() {
        let content = "revenue\n10\n";
        assert_eq!(ask(content, "financial revenue"), None);
        assert_eq!(
            ask(content, "na count for revenue").as_deref(),
            Some("The column 'revenue' has 0 missing values.")
        );
    }

    #[test]
    fn test_summary_without_column() {
        let table = CsvParser::new().parse_content(PEOPLE).unwrap();
        let profile = profile(&table);
        assert_eq!(
            answer("give me an overview", &table, &profile),
            Some(render_text(&profile))
        );
    }

    #[test]
    fn test_no_column_and_no_summary_keyword() {
        assert_eq!(ask(PEOPLE, "what is a pivot table?"), None);
    }

    #[test]
    fn test_resolved_column_without_stat_keyword() {
        assert_eq!(ask(PEOPLE, "tell me about age"), None);
    }

    #[test]
    fn test_column_resolution_by_exact_name() {
        let table = CsvParser::new()
            .parse_content("order id,order total\n1,10")
            .unwrap();
        let column = find_column("What is the ORDER TOTAL?", &table).unwrap();
        assert_eq!(column.name(), "order total");
    }

    #[test]
    fn test_column_resolution_by_shared_token() {
        let table = CsvParser::new()
            .parse_content("customer_name,unit price\nAnn,3")
            .unwrap();
        let column = find_column("average price please", &table).unwrap();
        assert_eq!(column.name(), "unit price");
        assert!(find_column("nothing relevant", &table).is_none());
    }

    #[test]
    fn test_column_resolution_is_deterministic() {
        let table = CsvParser::new()
            .parse_content("total sales,net sales\n1,2")
            .unwrap();
        let first = find_column("sales figures", &table).map(|c| c.name().to_string());
        let second = find_column("sales figures", &table).map(|c| c.name().to_string());
        assert_eq!(first.as_deref(), Some("total sales"));
        assert_eq!(first, second);
    }
}
