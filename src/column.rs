/// GridStore Column Registry
///
/// Columns are the dynamic, user-defined schema: an ordered list of
/// definitions with identity, display label, visibility, editability, a
/// value kind, and advisory validation rules. Identities are derived from
/// labels on creation and immutable afterwards, because rows reference
/// columns by identity.
///
/// Deleting a column (by leaving it out of a reorder) never cascades into
/// rows: orphaned row fields simply stop being queried or projected.
///
/// # Examples
///
/// ```
/// use gridstore::{ColumnKind, ColumnRegistry};
///
/// let mut registry = ColumnRegistry::default();
/// registry.add("Full Name", ColumnKind::Text, Vec::new()).unwrap();
/// registry.add("Age", ColumnKind::Number, Vec::new()).unwrap();
///
/// assert_eq!(registry.len(), 2);
/// assert!(registry.contains("full_name"));
/// assert!(registry.add("full name", ColumnKind::Text, Vec::new()).is_err());
/// ```

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Value kind of a column. `Select` columns carry an option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Number,
    Date,
    Email,
    Select,
}

/// Advisory validation rules attached to a column. The row store never
/// enforces these; `validate` evaluates them into issue lists on request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Opaque rule identifier evaluated by the host, not by this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_rule: Option<String>,
}

/// One column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub id: String,
    pub label: String,
    pub visible: bool,
    pub editable: bool,
    pub kind: ColumnKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub rules: ValidationRules,
}

/// Ordered collection of column definitions with identity lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDef>,
}

impl ColumnRegistry {
    /// Add a column with a fresh identity derived from the label
    /// (lowercased, whitespace runs collapsed to `_`). New columns start
    /// visible and editable with default rules.
    ///
    /// Fails on an empty label, a case-insensitive duplicate label (or a
    /// colliding identity), and a select kind without options.
    pub fn add(&mut self, label: &str, kind: ColumnKind, options: Vec<String>) -> Result<String> {
        let label = label.trim();
        if label.is_empty() {
            return Err(GridError::EmptyColumnLabel);
        }
        let lowered = label.to_lowercase();
        if self.columns.iter().any(|c| c.label.to_lowercase() == lowered) {
            return Err(GridError::DuplicateColumn(label.to_string()));
        }
        if kind == ColumnKind::Select && options.is_empty() {
            return Err(GridError::MissingOptions(label.to_string()));
        }

        let id = normalize_label(label);
        if self.columns.iter().any(|c| c.id == id) {
            return Err(GridError::DuplicateColumn(label.to_string()));
        }

        self.columns.push(ColumnDef {
            id: id.clone(),
            label: label.to_string(),
            visible: true,
            editable: true,
            kind,
            options,
            rules: ValidationRules::default(),
        });
        Ok(id)
    }

    /// Flip a column's visibility. Unknown identity is a silent no-op.
    pub fn toggle_visibility(&mut self, id: &str) {
        if let Some(col) = self.columns.iter_mut().find(|c| c.id == id) {
            col.visible = !col.visible;
        }
    }

    /// Replace a column's validation rules. Returns false when the
    /// identity is unknown.
    pub fn set_rules(&mut self, id: &str, rules: ValidationRules) -> bool {
        match self.columns.iter_mut().find(|c| c.id == id) {
            Some(col) => {
                col.rules = rules;
                true
            }
            None => false,
        }
    }

    /// Reorder columns to match the given identity order. Columns not
    /// mentioned are dropped; unknown identities in the order are ignored.
    pub fn reorder(&mut self, order: &[String]) {
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            if let Some(pos) = self.columns.iter().position(|c| &c.id == id) {
                reordered.push(self.columns.remove(pos));
            }
        }
        self.columns = reordered;
    }

    /// Legacy-state retrofit: force every column editable. Applied when a
    /// snapshot written before editability existed is restored.
    pub fn force_all_editable(&mut self) {
        for col in &mut self.columns {
            col.editable = true;
        }
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ColumnDef> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }

    /// Columns currently visible, in registry order.
    pub fn visible(&self) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| c.visible).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Identity derivation: lowercase, whitespace runs become single `_`.
fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_normalizes_label_into_id() {
        let mut registry = ColumnRegistry::default();
        let id = registry
            .add("  Contact   Email ", ColumnKind::Email, Vec::new())
            .unwrap();
        assert_eq!(id, "contact_email");
        let col = registry.get("contact_email").unwrap();
        assert_eq!(col.label, "Contact   Email");
        assert!(col.visible);
        assert!(col.editable);
    }

    #[test]
    fn test_add_rejects_duplicates_case_insensitively() {
        let mut registry = ColumnRegistry::default();
        registry.add("Name", ColumnKind::Text, Vec::new()).unwrap();
        let err = registry.add("NAME", ColumnKind::Text, Vec::new()).unwrap_err();
        assert!(matches!(err, GridError::DuplicateColumn(_)));
    }

    #[test]
    fn test_add_rejects_empty_label() {
        let mut registry = ColumnRegistry::default();
        let err = registry.add("   ", ColumnKind::Text, Vec::new()).unwrap_err();
        assert!(matches!(err, GridError::EmptyColumnLabel));
    }

    #[test]
    fn test_select_requires_options() {
        let mut registry = ColumnRegistry::default();
        let err = registry
            .add("Status", ColumnKind::Select, Vec::new())
            .unwrap_err();
        assert!(matches!(err, GridError::MissingOptions(_)));

        registry
            .add("Status", ColumnKind::Select, vec!["open".into(), "closed".into()])
            .unwrap();
        assert_eq!(registry.get("status").unwrap().options.len(), 2);
    }

    #[test]
    fn test_toggle_visibility() {
        let mut registry = ColumnRegistry::default();
        registry.add("Name", ColumnKind::Text, Vec::new()).unwrap();
        registry.toggle_visibility("name");
        assert!(!registry.get("name").unwrap().visible);
        registry.toggle_visibility("name");
        assert!(registry.get("name").unwrap().visible);
        // unknown id: no-op, no panic
        registry.toggle_visibility("ghost");
    }

    #[test]
    fn test_reorder_drops_missing_and_ignores_unknown() {
        let mut registry = ColumnRegistry::default();
        registry.add("A", ColumnKind::Text, Vec::new()).unwrap();
        registry.add("B", ColumnKind::Text, Vec::new()).unwrap();
        registry.add("C", ColumnKind::Text, Vec::new()).unwrap();

        registry.reorder(&["c".to_string(), "ghost".to_string(), "a".to_string()]);

        let ids: Vec<&str> = registry.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_force_all_editable() {
        let mut registry = ColumnRegistry::default();
        registry.add("A", ColumnKind::Text, Vec::new()).unwrap();
        registry.add("B", ColumnKind::Text, Vec::new()).unwrap();
        registry.get_mut("a").unwrap().editable = false;
        registry.get_mut("b").unwrap().editable = false;
        registry.force_all_editable();
        assert!(registry.iter().all(|c| c.editable));
    }

    #[test]
    fn test_visible_filters_hidden_columns() {
        let mut registry = ColumnRegistry::default();
        registry.add("A", ColumnKind::Text, Vec::new()).unwrap();
        registry.add("B", ColumnKind::Text, Vec::new()).unwrap();
        registry.toggle_visibility("a");
        let visible: Vec<&str> = registry.visible().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["b"]);
    }
}
