/// GridStore Export Projector and Interchange Codecs
///
/// An export names a scope (which rows) and always projects over the
/// visible columns. The projector produces a `Projection`: the ordered
/// (id, label) column list plus row values keyed by column id, ready to
/// hand to an encoder. CSV and JSON encoders live here; paginated document
/// layout is a collaborator's job and receives the projection as-is.
///
/// Scope semantics:
/// - `All` / `Visible`: every row (the two differ only in UI intent; both
///   restrict columns to visible ones).
/// - `Selected`: rows in the current selection. An empty selection means
///   an empty projection, never a fallback to all rows.
/// - `Filtered`: rows after search + filters; sort is not applied to
///   export ordering.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::ColumnRegistry;
use crate::error::Result;
use crate::filter::Filter;
use crate::query;
use crate::row::{Fields, Row, RowStore};
use crate::value::CellValue;

/// Which subset of rows an export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    All,
    Visible,
    Selected,
    Filtered,
}

impl ExportScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportScope::All => "all",
            ExportScope::Visible => "visible",
            ExportScope::Selected => "selected",
            ExportScope::Filtered => "filtered",
        }
    }
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One projected column: identity plus display label for the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionColumn {
    pub id: String,
    pub label: String,
}

/// The {columns, rows} pair handed to an encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub columns: Vec<ProjectionColumn>,
    pub rows: Vec<Fields>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encode as CSV: label header row, then display strings. Fields
    /// containing commas, quotes, or newlines are quoted with doubled
    /// quotes.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .map(|c| escape_csv_field(&c.label))
            .collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for row in &self.rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|c| {
                    let display = row
                        .get(&c.id)
                        .map(|v| v.display_string())
                        .unwrap_or_default();
                    escape_csv_field(&display)
                })
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }

        out
    }

    /// Encode as a pretty-printed JSON array of objects keyed by column
    /// id. Absent values become JSON null.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}

/// Build the projection for a scope from the live state pieces.
pub fn project(
    store: &RowStore,
    columns: &ColumnRegistry,
    search: &str,
    filters: &[Filter],
    selection: &HashSet<String>,
    scope: ExportScope,
) -> Projection {
    let visible = columns.visible();

    let projected_columns: Vec<ProjectionColumn> = visible
        .iter()
        .map(|c| ProjectionColumn {
            id: c.id.clone(),
            label: c.label.clone(),
        })
        .collect();

    let rows: Vec<&Row> = match scope {
        ExportScope::All | ExportScope::Visible => store.rows().iter().collect(),
        ExportScope::Selected => store
            .rows()
            .iter()
            .filter(|r| selection.contains(&r.id))
            .collect(),
        ExportScope::Filtered => query::run(store.rows(), columns, search, filters, None),
    };

    let rows = rows
        .into_iter()
        .map(|row| {
            visible
                .iter()
                .map(|c| (c.id.clone(), row.value(&c.id).clone()))
                .collect::<Fields>()
        })
        .collect();

    Projection {
        columns: projected_columns,
        rows,
    }
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split delimited text into rows of fields, honoring quoted fields with
/// embedded commas, doubled quotes, and newlines. The inverse of `to_csv`
/// for hosts without their own parser.
pub fn parse_delimited(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut current_row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current_field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
            }
            ',' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
            }
            '\n' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
                rows.push(std::mem::take(&mut current_row));
            }
            '\r' if !in_quotes => {}
            _ => {
                current_field.push(c);
            }
        }
    }

    if !current_field.is_empty() || !current_row.is_empty() {
        current_row.push(current_field);
        rows.push(current_row);
    }

    rows
}

/// Interpret delimited text as header + data rows, producing the
/// string-keyed records the import boundary consumes. Empty fields read
/// as absent; blank lines are skipped. Identity assignment is the
/// importer's job, not this function's.
pub fn records_from_delimited(input: &str) -> Vec<Fields> {
    let mut rows = parse_delimited(input);
    if rows.is_empty() {
        return Vec::new();
    }
    let header = rows.remove(0);

    rows.into_iter()
        .filter(|r| !r.iter().all(|f| f.trim().is_empty()))
        .map(|r| {
            header
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let raw = r.get(i).map(String::as_str).unwrap_or("");
                    let value = if raw.is_empty() {
                        CellValue::Absent
                    } else {
                        CellValue::Text(raw.to_string())
                    };
                    (key.clone(), value)
                })
                .collect::<Fields>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnKind;
    use crate::filter::FilterOp;

    fn fixture() -> (RowStore, ColumnRegistry) {
        let mut columns = ColumnRegistry::default();
        columns.add("Name", ColumnKind::Text, Vec::new()).unwrap();
        columns.add("Age", ColumnKind::Number, Vec::new()).unwrap();
        columns.add("Notes", ColumnKind::Text, Vec::new()).unwrap();
        columns.toggle_visibility("notes");

        let mut store = RowStore::default();
        for (id, name, age) in [("r1", "Alice", 30.0), ("r2", "Bob", 17.0), ("r3", "Carol", 45.0)] {
            let mut fields = Fields::new();
            fields.insert("name".to_string(), CellValue::Text(name.to_string()));
            fields.insert("age".to_string(), CellValue::Number(age));
            fields.insert("notes".to_string(), CellValue::Text("hidden".to_string()));
            store.push(Row::new(id, fields));
        }
        (store, columns)
    }

    #[test]
    fn test_projection_restricts_to_visible_columns() {
        let (store, columns) = fixture();
        let projection = project(&store, &columns, "", &[], &HashSet::new(), ExportScope::All);

        let ids: Vec<&str> = projection.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["name", "age"]);
        assert_eq!(projection.rows.len(), 3);
        assert!(!projection.rows[0].contains_key("notes"));
    }

    #[test]
    fn test_selected_scope_with_empty_selection_is_empty() {
        let (store, columns) = fixture();
        let projection = project(
            &store,
            &columns,
            "",
            &[],
            &HashSet::new(),
            ExportScope::Selected,
        );
        assert!(projection.is_empty());
    }

    #[test]
    fn test_selected_scope_restricts_rows() {
        let (store, columns) = fixture();
        let selection: HashSet<String> = ["r2".to_string()].into_iter().collect();
        let projection = project(&store, &columns, "", &[], &selection, ExportScope::Selected);
        assert_eq!(projection.rows.len(), 1);
        assert_eq!(projection.rows[0]["name"].as_text(), Some("Bob"));
    }

    #[test]
    fn test_filtered_scope_runs_search_and_filters_without_sort() {
        let (store, columns) = fixture();
        let filters = vec![Filter::new("age", FilterOp::GreaterThan, "18")];
        let projection = project(
            &store,
            &columns,
            "",
            &filters,
            &HashSet::new(),
            ExportScope::Filtered,
        );
        let names: Vec<&str> = projection
            .rows
            .iter()
            .map(|r| r["name"].as_text().unwrap())
            .collect();
        // store order, not sorted
        assert_eq!(names, vec!["Alice", "Carol"]);
    }

    #[test]
    fn test_csv_header_uses_labels_and_escapes() {
        let mut columns = ColumnRegistry::default();
        columns.add("Name", ColumnKind::Text, Vec::new()).unwrap();
        columns.add("Quote", ColumnKind::Text, Vec::new()).unwrap();

        let mut store = RowStore::default();
        let mut fields = Fields::new();
        fields.insert("name".to_string(), CellValue::Text("a,b".to_string()));
        fields.insert("quote".to_string(), CellValue::Text("say \"hi\"".to_string()));
        store.push(Row::new("r1", fields));

        let projection = project(&store, &columns, "", &[], &HashSet::new(), ExportScope::All);
        let csv = projection.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Name,Quote"));
        assert_eq!(lines.next(), Some("\"a,b\",\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_json_keys_rows_by_column_id() {
        let (store, columns) = fixture();
        let projection = project(&store, &columns, "", &[], &HashSet::new(), ExportScope::All);
        let json = projection.to_json().unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["name"], serde_json::json!("Alice"));
        assert_eq!(parsed[0]["age"], serde_json::json!(30.0));
    }

    #[test]
    fn test_parse_delimited_round_trip() {
        let input = "name,notes\nAlice,\"line one\nline two\"\nBob,\"has \"\"quotes\"\"\"\n";
        let rows = parse_delimited(input);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Alice", "line one\nline two"]);
        assert_eq!(rows[2], vec!["Bob", "has \"quotes\""]);
    }

    #[test]
    fn test_records_from_delimited() {
        let input = "name,age\nAlice,30\nBob,\n\n";
        let records = records_from_delimited(input);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"].as_text(), Some("Alice"));
        assert_eq!(records[0]["age"].as_text(), Some("30"));
        assert!(records[1]["age"].is_absent());
    }
}
