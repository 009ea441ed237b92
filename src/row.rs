/// GridStore Row Store
///
/// Rows are identity-keyed records with an open, ordered field map: a row
/// may carry values for columns that are no longer registered (orphaned by
/// a column removal) and those fields are preserved untouched. The store
/// keeps rows in insertion order, which is the sequence the query pipeline
/// sees when no sort is active.
///
/// All mutations are synchronous and immediately visible to the next read;
/// there is no transaction or rollback. Operations addressing an identity
/// that no longer exists are silent no-ops.

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::value::CellValue;

/// Ordered mapping from column identity to cell value.
pub type Fields = BTreeMap<String, CellValue>;

/// One data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Row {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Row {
            id: id.into(),
            fields,
        }
    }

    /// Value for a column identity; missing fields read as absent.
    pub fn value(&self, column_id: &str) -> &CellValue {
        static ABSENT: CellValue = CellValue::Absent;
        self.fields.get(column_id).unwrap_or(&ABSENT)
    }

    pub fn set(&mut self, column_id: impl Into<String>, value: CellValue) {
        self.fields.insert(column_id.into(), value);
    }

    /// Merge a partial field set into this row, overwriting on key collision.
    pub fn merge(&mut self, partial: &Fields) {
        for (key, value) in partial {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

/// Insertion-ordered collection of rows keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    /// Replace the entire collection (bulk load / import).
    pub fn replace_all(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    /// Append one row. The caller supplies the identity.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn get(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Merge a partial field set into the row with the given identity.
    /// Returns whether a row was updated; unknown identity is a no-op.
    pub fn update(&mut self, id: &str, partial: &Fields) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.merge(partial);
                true
            }
            None => false,
        }
    }

    /// Remove the row with the given identity, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Row> {
        let pos = self.rows.iter().position(|r| r.id == id)?;
        Some(self.rows.remove(pos))
    }

    /// Remove every row whose identity is in the set. Returns how many
    /// rows were removed.
    pub fn bulk_remove(&mut self, ids: &HashSet<String>) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !ids.contains(&r.id));
        before - self.rows.len()
    }

    /// Merge one shared partial field set into every row whose identity is
    /// in the set. Returns how many rows were updated.
    pub fn bulk_update(&mut self, ids: &HashSet<String>, partial: &Fields) -> usize {
        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|r| ids.contains(&r.id)) {
            row.merge(partial);
            updated += 1;
        }
        updated
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
