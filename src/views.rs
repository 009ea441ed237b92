/// GridStore Saved Views
///
/// A saved view is an immutable named snapshot of the query configuration:
/// the full column registry state, the filter set, the sort spec, and the
/// search text. It references no rows and no selection. Views are created
/// by an explicit save, never mutated afterwards, and deleted explicitly.
///
/// The captured state is copied by value at save time, so later mutation
/// of the live grid cannot leak into an existing view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::column::ColumnRegistry;
use crate::filter::Filter;
use crate::query::SortSpec;

/// Immutable named snapshot of query configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub columns: ColumnRegistry,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub search: String,
}

/// Collection of saved views in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewStore {
    views: Vec<SavedView>,
}

impl ViewStore {
    pub fn add(&mut self, view: SavedView) {
        self.views.push(view);
    }

    pub fn get(&self, id: &str) -> Option<&SavedView> {
        self.views.iter().find(|v| v.id == id)
    }

    /// Remove a view by identity, returning it if present. No cascading
    /// effects on live state.
    pub fn remove(&mut self, id: &str) -> Option<SavedView> {
        let pos = self.views.iter().position(|v| v.id == id)?;
        Some(self.views.remove(pos))
    }

    pub fn views(&self) -> &[SavedView] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: &str, name: &str) -> SavedView {
        SavedView {
            id: id.to_string(),
            name: name.to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            columns: ColumnRegistry::default(),
            filters: Vec::new(),
            sort: None,
            search: String::new(),
        }
    }

    #[test]
    fn test_add_get_remove() {
        let mut store = ViewStore::default();
        store.add(view("v1", "adults"));
        store.add(view("v2", "minors"));

        assert_eq!(store.get("v1").unwrap().name, "adults");
        assert_eq!(store.len(), 2);

        let removed = store.remove("v1").unwrap();
        assert_eq!(removed.name, "adults");
        assert!(store.get("v1").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut store = ViewStore::default();
        assert!(store.remove("ghost").is_none());
    }
}
