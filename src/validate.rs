/// GridStore Advisory Validation
///
/// Column rules are metadata: the row store accepts any value, and this
/// module evaluates rules into issue lists on request. Issues are plain
/// data the host renders inline; nothing here rejects a mutation.
///
/// A malformed regex pattern is the one hard failure: it is a
/// configuration error surfaced to the caller, not an issue stored
/// against a row. Opaque custom rule identifiers are skipped; the host
/// evaluates those.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::column::{ColumnKind, ColumnRegistry};
use crate::error::{GridError, Result};
use crate::row::Row;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One validation finding against a row field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row_id: String,
    pub column_id: String,
    pub message: String,
}

/// Evaluate every registered column's rules against one row.
pub fn validate_row(row: &Row, columns: &ColumnRegistry) -> Result<Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    for col in columns.iter() {
        let cell = row.value(&col.id);
        if cell.is_blank() {
            if col.rules.required {
                issues.push(issue(row, &col.id, format!("{} is required", col.label)));
            }
            continue;
        }

        let display = cell.display_string();
        let number = cell.coerce_number();

        match col.kind {
            ColumnKind::Number => {
                if number.is_nan() {
                    issues.push(issue(row, &col.id, format!("{} must be a number", col.label)));
                }
            }
            ColumnKind::Email => {
                let re = Regex::new(EMAIL_PATTERN).map_err(|source| GridError::InvalidPattern {
                    pattern: EMAIL_PATTERN.to_string(),
                    source,
                })?;
                if !re.is_match(&display) {
                    issues.push(issue(
                        row,
                        &col.id,
                        format!("{} must be a valid email address", col.label),
                    ));
                }
            }
            ColumnKind::Date => {
                if NaiveDate::parse_from_str(display.trim(), DATE_FORMAT).is_err() {
                    issues.push(issue(
                        row,
                        &col.id,
                        format!("{} must be a date (YYYY-MM-DD)", col.label),
                    ));
                }
            }
            ColumnKind::Select => {
                if !col.options.iter().any(|o| o == &display) {
                    issues.push(issue(
                        row,
                        &col.id,
                        format!("{} must be one of the configured options", col.label),
                    ));
                }
            }
            ColumnKind::Text => {}
        }

        if !number.is_nan() {
            if let Some(min) = col.rules.min {
                if number < min {
                    issues.push(issue(
                        row,
                        &col.id,
                        format!("{} must be at least {}", col.label, min),
                    ));
                }
            }
            if let Some(max) = col.rules.max {
                if number > max {
                    issues.push(issue(
                        row,
                        &col.id,
                        format!("{} must be at most {}", col.label, max),
                    ));
                }
            }
        }

        if let Some(pattern) = &col.rules.pattern {
            let re = Regex::new(pattern).map_err(|source| GridError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            if !re.is_match(&display) {
                issues.push(issue(
                    row,
                    &col.id,
                    format!("{} does not match the expected pattern", col.label),
                ));
            }
        }
    }

    Ok(issues)
}

fn issue(row: &Row, column_id: &str, message: String) -> ValidationIssue {
    ValidationIssue {
        row_id: row.id.clone(),
        column_id: column_id.to_string(),
        message,
    }
}
