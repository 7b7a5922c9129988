// ============================================================
// TOOL RULES
// ============================================================
// Tool mentions answered with a canned tip before similarity search

use once_cell::sync::Lazy;
use regex::Regex;

pub struct ToolRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub tip: &'static str,
}

impl ToolRule {
    fn new(name: &'static str, pattern: &str, tip: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(&format!("(?i){}", pattern)).unwrap(),
            tip,
        }
    }
}

/// Evaluated in order; the first matching rule wins
pub static TOOL_RULES: Lazy<Vec<ToolRule>> = Lazy::new(|| {
    vec![
        ToolRule::new(
            "google_sheets",
            r"\bgoogle\s?sheets?\b",
            "In Google Sheets you can speed up analytics by using FILTER, QUERY, \
             and Pivot tables. Combine named ranges with the Explore feature for \
             automatic visual insights.",
        ),
        ToolRule::new(
            "excel",
            r"\bexcel\b",
            "Excel analysts rely on dynamic arrays, XLOOKUP, Power Query, and \
             Power Pivot for modeling larger datasets. Consider using Alt + Shift \
             + = for quick auto-sum blocks.",
        ),
        ToolRule::new(
            "power_bi",
            r"\bpower\s?bi\b",
            "Power BI best practice: split your model into Star Schema tables, \
             enable incremental refresh for large fact tables, and validate DAX \
             with Performance Analyzer.",
        ),
        ToolRule::new(
            "tableau",
            r"\btableau\b",
            "In Tableau, prefer extracts for faster dashboards, use Level of Detail \
             expressions for cohort logic, and document data sources with Data Catalog.",
        ),
        ToolRule::new(
            "sql",
            r"\bsql\b",
            "SQL tip: profile the table with COUNT(*), MIN/MAX timestamps, and use \
             WINDOW functions (ROW_NUMBER, LAG, LEAD) for advanced analytics.",
        ),
        ToolRule::new(
            "spss",
            r"\bspss\b",
            "SPSS workflows often start with Analyze → Descriptive Statistics. For \
             predictive modeling, check out Analyze → Regression → Linear or \
             Logistic, and export syntax for reproducibility.",
        ),
    ]
});

/// First rule whose pattern appears in the question
pub fn match_rule(question: &str) -> Option<&'static ToolRule> {
    TOOL_RULES.iter().find(|rule| rule.pattern.is_match(question))
}
