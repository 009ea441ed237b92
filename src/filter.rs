/// GridStore Filter Predicates
///
/// A filter targets one column with one operator and up to two values (the
/// second only for `between`). Filter sets are conjunctive: a row passes
/// only if it satisfies every filter, so set order never affects results.
///
/// String operators compare case-insensitively on the cell's display
/// string. Numeric operators coerce both sides; a side that does not
/// coerce becomes NaN and the comparison is false, so filtering a text
/// column with `greater-than` simply matches nothing instead of erroring.

use serde::{Deserialize, Serialize};

use crate::row::Row;

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOp {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    Between,
    IsEmpty,
    IsNotEmpty,
}

impl FilterOp {
    /// `between` is the only operator taking a second value.
    pub fn requires_second_value(&self) -> bool {
        matches!(self, FilterOp::Between)
    }

    /// Operators that take no value at all.
    pub fn is_unary(&self) -> bool {
        matches!(self, FilterOp::IsEmpty | FilterOp::IsNotEmpty)
    }
}

/// One filter condition against a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_value: Option<String>,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Filter {
            column: column.into(),
            op,
            value: value.into(),
            second_value: None,
        }
    }

    pub fn between(
        column: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        Filter {
            column: column.into(),
            op: FilterOp::Between,
            value: low.into(),
            second_value: Some(high.into()),
        }
    }

    /// Evaluate this filter against a row.
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.value(&self.column);
        match self.op {
            FilterOp::Equals => cell.display_string().to_lowercase() == self.value.to_lowercase(),
            FilterOp::Contains => cell
                .display_string()
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
            FilterOp::StartsWith => cell
                .display_string()
                .to_lowercase()
                .starts_with(&self.value.to_lowercase()),
            FilterOp::EndsWith => cell
                .display_string()
                .to_lowercase()
                .ends_with(&self.value.to_lowercase()),
            FilterOp::GreaterThan => cell.coerce_number() > parse_number(&self.value),
            FilterOp::LessThan => cell.coerce_number() < parse_number(&self.value),
            FilterOp::Between => {
                let n = cell.coerce_number();
                let low = parse_number(&self.value);
                let high = self
                    .second_value
                    .as_deref()
                    .map(parse_number)
                    .unwrap_or(f64::NAN);
                n >= low && n <= high
            }
            FilterOp::IsEmpty => cell.is_blank(),
            FilterOp::IsNotEmpty => !cell.is_blank(),
        }
    }
}

fn parse_number(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Fields;
    use crate::value::CellValue;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        let mut fields = Fields::new();
        for (key, value) in pairs {
            fields.insert(key.to_string(), value.clone());
        }
        Row::new("r1", fields)
    }

    #[test]
    fn test_equals_is_case_insensitive() {
        let r = row(&[("name", CellValue::Text("Alice".into()))]);
        assert!(Filter::new("name", FilterOp::Equals, "alice").matches(&r));
        assert!(!Filter::new("name", FilterOp::Equals, "alic").matches(&r));
    }

    #[test]
    fn test_contains_starts_ends() {
        let r = row(&[("name", CellValue::Text("John Smith".into()))]);
        assert!(Filter::new("name", FilterOp::Contains, "n sm").matches(&r));
        assert!(Filter::new("name", FilterOp::StartsWith, "john").matches(&r));
        assert!(Filter::new("name", FilterOp::EndsWith, "SMITH").matches(&r));
        assert!(!Filter::new("name", FilterOp::StartsWith, "smith").matches(&r));
    }

    #[test]
    fn test_greater_than_numeric() {
        let minor = row(&[("age", CellValue::Number(17.0))]);
        let adult = row(&[("age", CellValue::Number(40.0))]);
        let filter = Filter::new("age", FilterOp::GreaterThan, "18");
        assert!(!filter.matches(&minor));
        assert!(filter.matches(&adult));
    }

    #[test]
    fn test_numeric_ops_coerce_text_cells() {
        let r = row(&[("age", CellValue::Text("25".into()))]);
        assert!(Filter::new("age", FilterOp::GreaterThan, "18").matches(&r));
        assert!(Filter::new("age", FilterOp::LessThan, "30").matches(&r));
    }

    #[test]
    fn test_non_numeric_comparison_matches_nothing() {
        let r = row(&[("age", CellValue::Text("unknown".into()))]);
        assert!(!Filter::new("age", FilterOp::GreaterThan, "18").matches(&r));
        assert!(!Filter::new("age", FilterOp::LessThan, "18").matches(&r));
    }

    #[test]
    fn test_between() {
        let r = row(&[("age", CellValue::Number(25.0))]);
        assert!(Filter::between("age", "18", "30").matches(&r));
        assert!(Filter::between("age", "25", "25").matches(&r));
        assert!(!Filter::between("age", "26", "30").matches(&r));
    }

    #[test]
    fn test_between_with_non_numeric_bounds_matches_nothing() {
        let r = row(&[("age", CellValue::Number(25.0))]);
        assert!(!Filter::between("age", "low", "high").matches(&r));
        // missing second value behaves like a NaN bound
        let mut open_ended = Filter::new("age", FilterOp::Between, "18");
        open_ended.second_value = None;
        assert!(!open_ended.matches(&r));
    }

    #[test]
    fn test_is_empty_and_is_not_empty() {
        let blank = row(&[("note", CellValue::Text("   ".into()))]);
        let absent = row(&[]);
        let filled = row(&[("note", CellValue::Text("hi".into()))]);

        let empty = Filter::new("note", FilterOp::IsEmpty, "");
        let not_empty = Filter::new("note", FilterOp::IsNotEmpty, "");

        assert!(empty.matches(&blank));
        assert!(empty.matches(&absent));
        assert!(!empty.matches(&filled));
        assert!(not_empty.matches(&filled));
        assert!(!not_empty.matches(&absent));
    }

    #[test]
    fn test_missing_column_reads_as_absent() {
        let r = row(&[]);
        assert!(!Filter::new("ghost", FilterOp::Contains, "x").matches(&r));
        // empty needle is a substring of the empty display string
        assert!(Filter::new("ghost", FilterOp::Contains, "").matches(&r));
    }
}
