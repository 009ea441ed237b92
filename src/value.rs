/// GridStore Cell Values
///
/// A cell holds one scalar belonging to a row field: text, number, boolean,
/// or absent. Rows are open mappings, so "absent" is a first-class value
/// rather than a missing key error.
///
/// # Coercion
///
/// Query operators never fail on mismatched types. String operators work on
/// the display string; numeric operators work on a best-effort coercion
/// where anything non-numeric becomes NaN, and NaN loses every ordered
/// comparison. Callers therefore get "row does not match" instead of an
/// error when filtering numbers against text data.

use serde::{Deserialize, Serialize};

/// Scalar value stored in a row field.
///
/// Serializes untagged, so snapshots carry plain JSON scalars
/// (`"Alice"`, `42.5`, `true`, `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Absent,
}

impl CellValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string a user sees for this value. Absent renders as the empty
    /// string; whole numbers drop their fractional part.
    pub fn display_string(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Absent => String::new(),
        }
    }

    /// Best-effort numeric coercion. Text parses after trimming; anything
    /// that is not a number (including booleans and absent values) becomes
    /// NaN, so ordered comparisons against it are always false.
    pub fn coerce_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    /// A value is blank when it is absent or its trimmed display string is
    /// empty. This is the `is-empty` / `is-not-empty` operator semantics.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Absent => true,
            other => other.display_string().trim().is_empty(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
