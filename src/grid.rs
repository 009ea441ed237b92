/// GridStore Data Grid
///
/// `DataGrid` is the single state-owning component: the column registry
/// and row store (the mutable ground truth), the transient query state
/// (search, filters, sort, page, page size), the selection, saved views,
/// the activity log, and validation results. Every mutation in the system
/// is a method here; nothing bypasses it.
///
/// The grid is single-actor and synchronous: each operation runs to
/// completion before the next, and reads recompute the query pipeline
/// against the current store, so they are always consistent with the most
/// recent write. A port that introduces real concurrency must wrap store
/// mutation and pipeline reads in a single-writer discipline, because a
/// read spans multiple passes over the rows.
///
/// # Examples
///
/// ```
/// use gridstore::{CellValue, ColumnKind, DataGrid, Fields};
///
/// let mut grid = DataGrid::new();
/// grid.add_column("Name", ColumnKind::Text, Vec::new()).unwrap();
/// grid.add_column("Age", ColumnKind::Number, Vec::new()).unwrap();
///
/// let mut fields = Fields::new();
/// fields.insert("name".to_string(), CellValue::Text("Alice".into()));
/// fields.insert("age".to_string(), CellValue::Number(30.0));
/// let id = grid.add_row(fields);
///
/// assert_eq!(grid.rows().len(), 1);
/// assert!(grid.store().contains(&id));
/// ```

use std::collections::HashSet;
use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityEntry, ActivityKind, ActivityLog, DEFAULT_ACTOR};
use crate::column::{ColumnKind, ColumnRegistry};
use crate::error::{GridError, Result};
use crate::export::{self, ExportScope, Projection};
use crate::filter::Filter;
use crate::ident::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::query::{self, SortSpec};
use crate::row::{Fields, Row, RowStore};
use crate::validate::{self, ValidationIssue};
use crate::value::CellValue;
use crate::views::{SavedView, ViewStore};

const DEFAULT_PAGE_SIZE: usize = 10;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// The whole-state snapshot the host persists and restores. Volatile
/// UI-only fields (`editing_rows`) are carried for shape compatibility but
/// reset on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub columns: ColumnRegistry,
    pub rows: RowStore,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub editing_rows: Vec<String>,
    #[serde(default)]
    pub selected_rows: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub activity_log: ActivityLog,
    #[serde(default)]
    pub saved_views: ViewStore,
    #[serde(default)]
    pub validation_errors: Vec<ValidationIssue>,
    #[serde(default)]
    pub show_analytics: bool,
}

/// State-owning tabular data manager.
pub struct DataGrid {
    columns: ColumnRegistry,
    store: RowStore,
    search: String,
    filters: Vec<Filter>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: usize,
    editing_rows: HashSet<String>,
    selection: HashSet<String>,
    views: ViewStore,
    log: ActivityLog,
    validation_errors: Vec<ValidationIssue>,
    show_analytics: bool,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl DataGrid {
    /// Create an empty grid with random UUID identities and the system
    /// clock.
    pub fn new() -> Self {
        Self::with_parts(Box::new(UuidGenerator), Box::new(SystemClock))
    }

    /// Create an empty grid with explicit identity and time sources.
    /// Tests use this with deterministic generators.
    pub fn with_parts(ids: Box<dyn IdGenerator>, clock: Box<dyn Clock>) -> Self {
        DataGrid {
            columns: ColumnRegistry::default(),
            store: RowStore::default(),
            search: String::new(),
            filters: Vec::new(),
            sort: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            editing_rows: HashSet::new(),
            selection: HashSet::new(),
            views: ViewStore::default(),
            log: ActivityLog::default(),
            validation_errors: Vec::new(),
            show_analytics: false,
            ids,
            clock,
        }
    }

    /// Restore a grid from a persisted snapshot.
    pub fn from_snapshot(snapshot: GridSnapshot) -> Self {
        let mut grid = Self::new();
        grid.restore(snapshot);
        grid
    }

    // ==================== Column operations ====================

    /// Add a column; see `ColumnRegistry::add` for identity derivation and
    /// failure cases.
    pub fn add_column(
        &mut self,
        label: &str,
        kind: ColumnKind,
        options: Vec<String>,
    ) -> Result<String> {
        let id = self.columns.add(label, kind, options)?;
        debug!("added column '{}'", id);
        self.log_activity(
            ActivityKind::Create,
            None,
            format!("Added column '{}'", label.trim()),
        );
        Ok(id)
    }

    /// Flip a column's visibility. Unknown identity is a silent no-op.
    pub fn toggle_column(&mut self, id: &str) {
        self.columns.toggle_visibility(id);
    }

    /// Reorder columns; identities missing from the order are dropped and
    /// unknown identities ignored.
    pub fn reorder_columns(&mut self, order: &[String]) {
        self.columns.reorder(order);
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut ColumnRegistry {
        &mut self.columns
    }

    // ==================== Row operations ====================

    /// Add one row with a freshly generated identity. Returns the identity.
    pub fn add_row(&mut self, fields: Fields) -> String {
        let id = self.ids.next_id();
        self.store.push(Row::new(id.clone(), fields));
        self.log_activity(ActivityKind::Create, Some(id.clone()), "Added row".to_string());
        id
    }

    /// Merge a partial field set into a row. Unknown identity is a silent
    /// no-op; returns whether a row changed.
    pub fn update_row(&mut self, id: &str, partial: &Fields) -> bool {
        let updated = self.store.update(id, partial);
        if updated {
            self.log_activity(ActivityKind::Update, Some(id.to_string()), "Updated row".to_string());
        }
        updated
    }

    /// Delete one row. Unknown identity is a silent no-op; returns whether
    /// a row was removed. The selection is not touched here; stale
    /// entries are pruned whenever the selection is read.
    pub fn delete_row(&mut self, id: &str) -> bool {
        let removed = self.store.remove(id).is_some();
        if removed {
            self.log_activity(ActivityKind::Delete, Some(id.to_string()), "Deleted row".to_string());
        }
        removed
    }

    /// Replace the full row store with imported records, assigning each a
    /// fresh identity. Resets to the first page and logs one import event.
    pub fn import_records(&mut self, records: Vec<Fields>, source_name: &str) -> usize {
        let count = records.len();
        let rows: Vec<Row> = records
            .into_iter()
            .map(|fields| Row::new(self.ids.next_id(), fields))
            .collect();
        self.store.replace_all(rows);
        self.page = 0;
        info!("imported {} rows from '{}'", count, source_name);
        self.log_activity(
            ActivityKind::Import,
            None,
            format!("Imported {} rows from {}", count, source_name),
        );
        count
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn rows(&self) -> &[Row] {
        self.store.rows()
    }

    // ==================== Query state ====================

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Remove a filter by position. Out-of-range is a silent no-op.
    pub fn remove_filter(&mut self, index: usize) -> Option<Filter> {
        if index < self.filters.len() {
            Some(self.filters.remove(index))
        } else {
            None
        }
    }

    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Change the page size and reset to the first page. A zero size is
    /// ignored.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            return;
        }
        self.page_size = page_size;
        self.page = 0;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // ==================== Reads ====================

    /// Run the full query pipeline against the current store: search,
    /// filters, sort. Recomputed on every call.
    pub fn query(&self) -> Vec<&Row> {
        query::run(
            self.store.rows(),
            &self.columns,
            &self.search,
            &self.filters,
            self.sort.as_ref(),
        )
    }

    /// The current page window of the query result.
    pub fn page_rows(&self) -> Vec<&Row> {
        let matched = self.query();
        query::paginate(&matched, self.page, self.page_size).to_vec()
    }

    /// Number of rows the pipeline currently yields.
    pub fn matched_count(&self) -> usize {
        self.query().len()
    }

    /// Number of pages the current result spans.
    pub fn page_count(&self) -> usize {
        self.matched_count().div_ceil(self.page_size.max(1))
    }

    // ==================== Selection & bulk operations ====================

    /// Toggle one identity's membership in the selection.
    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
        }
    }

    /// Replace the selection wholesale ("select all visible" / "select
    /// none").
    pub fn set_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.selection = ids.into_iter().collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &HashSet<String> {
        &self.selection
    }

    /// Selected rows that still exist, in store order. Stale identities
    /// are filtered out here rather than eagerly on deletion.
    pub fn selected_rows(&self) -> Vec<&Row> {
        self.store
            .rows()
            .iter()
            .filter(|r| self.selection.contains(&r.id))
            .collect()
    }

    fn pruned_selection(&self) -> HashSet<String> {
        self.selected_rows().iter().map(|r| r.id.clone()).collect()
    }

    /// Delete every selected row, then clear the selection. Both happen
    /// within this call; no state is observable where rows are gone but
    /// the selection still references them.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.pruned_selection();
        let removed = self.store.bulk_remove(&ids);
        self.selection.clear();
        if removed > 0 {
            self.log_activity(ActivityKind::Delete, None, format!("Deleted {} rows", removed));
        }
        removed
    }

    /// Apply one shared partial field set to every selected row, then
    /// clear the selection.
    pub fn update_selected(&mut self, partial: &Fields) -> usize {
        let ids = self.pruned_selection();
        let updated = self.store.bulk_update(&ids, partial);
        self.selection.clear();
        if updated > 0 {
            self.log_activity(ActivityKind::Update, None, format!("Updated {} rows", updated));
        }
        updated
    }

    /// Duplicate every selected row under a fresh identity, marking the
    /// first visible text column's value with a " (Copy)" suffix. Unlike
    /// delete/update, duplication keeps the selection: the originals stay
    /// selected.
    pub fn duplicate_selected(&mut self) -> Vec<String> {
        let marker_column = self
            .columns
            .visible()
            .into_iter()
            .find(|c| c.kind == ColumnKind::Text)
            .map(|c| c.id.clone());

        let originals: Vec<Fields> = self
            .store
            .rows()
            .iter()
            .filter(|r| self.selection.contains(&r.id))
            .map(|r| r.fields.clone())
            .collect();

        let mut new_ids = Vec::with_capacity(originals.len());
        for mut fields in originals {
            if let Some(col) = &marker_column {
                let display = fields
                    .get(col)
                    .map(|v| v.display_string())
                    .unwrap_or_default();
                let marked = if display.is_empty() {
                    "(Copy)".to_string()
                } else {
                    format!("{} (Copy)", display)
                };
                fields.insert(col.clone(), CellValue::Text(marked));
            }
            let id = self.ids.next_id();
            self.store.push(Row::new(id.clone(), fields));
            new_ids.push(id);
        }

        if !new_ids.is_empty() {
            self.log_activity(
                ActivityKind::Create,
                None,
                format!("Duplicated {} rows", new_ids.len()),
            );
        }
        new_ids
    }

    // ==================== Editing-row tracking ====================

    pub fn begin_edit(&mut self, id: &str) {
        self.editing_rows.insert(id.to_string());
    }

    pub fn end_edit(&mut self, id: &str) {
        self.editing_rows.remove(id);
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing_rows.contains(id)
    }

    pub fn editing_rows(&self) -> &HashSet<String> {
        &self.editing_rows
    }

    // ==================== Saved views ====================

    /// Capture the current columns, filters, sort, and search as a named
    /// view. The captured state is copied by value; later live mutation
    /// cannot affect it. Returns the view identity.
    pub fn save_view(&mut self, name: &str) -> String {
        let view = SavedView {
            id: self.ids.next_id(),
            name: name.to_string(),
            created_at: self.clock.now(),
            columns: self.columns.clone(),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            search: self.search.clone(),
        };
        let id = view.id.clone();
        self.views.add(view);
        self.log_activity(ActivityKind::Create, None, format!("Saved view '{}'", name));
        id
    }

    /// Replace the live columns, filters, sort, and search with a saved
    /// view's copies and reset to the first page. Rows, selection, and
    /// page size are untouched. Unknown identity is a silent no-op;
    /// returns whether a view was loaded.
    pub fn load_view(&mut self, id: &str) -> bool {
        let view = match self.views.get(id) {
            Some(view) => view.clone(),
            None => return false,
        };
        self.columns = view.columns;
        self.filters = view.filters;
        self.sort = view.sort;
        self.search = view.search;
        self.page = 0;
        debug!("loaded view '{}'", id);
        true
    }

    /// Delete a saved view. Unknown identity is a silent no-op; returns
    /// whether a view was removed.
    pub fn delete_view(&mut self, id: &str) -> bool {
        match self.views.remove(id) {
            Some(view) => {
                self.log_activity(
                    ActivityKind::Delete,
                    None,
                    format!("Deleted view '{}'", view.name),
                );
                true
            }
            None => false,
        }
    }

    pub fn views(&self) -> &[SavedView] {
        self.views.views()
    }

    // ==================== Export ====================

    /// Build the projection for a scope without exporting.
    pub fn project(&self, scope: ExportScope) -> Projection {
        export::project(
            &self.store,
            &self.columns,
            &self.search,
            &self.filters,
            &self.selection,
            scope,
        )
    }

    /// Export a scope as CSV. Declines when the projection is empty or no
    /// file name is given; logs one export event on success.
    pub fn export_csv(&mut self, scope: ExportScope, file_name: &str) -> Result<String> {
        let projection = self.checked_projection(scope, file_name, "csv")?;
        Ok(projection.to_csv())
    }

    /// Export a scope as JSON. Same decline rules as CSV.
    pub fn export_json(&mut self, scope: ExportScope, file_name: &str) -> Result<String> {
        let projection = self.checked_projection(scope, file_name, "json")?;
        projection.to_json()
    }

    /// Export a scope as a projection for an external paginated-document
    /// encoder. Same decline rules as CSV.
    pub fn export_document(&mut self, scope: ExportScope, file_name: &str) -> Result<Projection> {
        self.checked_projection(scope, file_name, "document")
    }

    fn checked_projection(
        &mut self,
        scope: ExportScope,
        file_name: &str,
        format: &str,
    ) -> Result<Projection> {
        if file_name.trim().is_empty() {
            return Err(GridError::MissingExportName);
        }
        let projection = self.project(scope);
        if projection.is_empty() {
            debug!("export declined: scope '{}' matched no rows", scope);
            return Err(GridError::EmptyExport(scope));
        }
        info!(
            "exporting {} rows ({}) to '{}'",
            projection.rows.len(),
            format,
            file_name.trim()
        );
        self.log_activity(
            ActivityKind::Export,
            None,
            format!(
                "Exported {} rows to {} ({})",
                projection.rows.len(),
                file_name.trim(),
                format
            ),
        );
        Ok(projection)
    }

    // ==================== Validation ====================

    /// Re-validate every row against the current column rules, replacing
    /// the stored issue list.
    pub fn validate_all(&mut self) -> Result<&[ValidationIssue]> {
        let mut issues = Vec::new();
        for row in self.store.rows() {
            issues.extend(validate::validate_row(row, &self.columns)?);
        }
        self.validation_errors = issues;
        Ok(&self.validation_errors)
    }

    /// Re-validate one row, replacing its stored issues. Unknown identity
    /// is a silent no-op yielding no issues.
    pub fn validate_row(&mut self, id: &str) -> Result<Vec<ValidationIssue>> {
        let row = match self.store.get(id) {
            Some(row) => row,
            None => return Ok(Vec::new()),
        };
        let issues = validate::validate_row(row, &self.columns)?;
        self.validation_errors.retain(|i| i.row_id != id);
        self.validation_errors.extend(issues.iter().cloned());
        Ok(issues)
    }

    pub fn validation_errors(&self) -> &[ValidationIssue] {
        &self.validation_errors
    }

    // ==================== Misc state ====================

    pub fn set_show_analytics(&mut self, show: bool) {
        self.show_analytics = show;
    }

    pub fn show_analytics(&self) -> bool {
        self.show_analytics
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }

    // ==================== Snapshot ====================

    /// Capture the whole persisted state.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            columns: self.columns.clone(),
            rows: self.store.clone(),
            search: self.search.clone(),
            sort: self.sort.clone(),
            page: self.page,
            page_size: self.page_size,
            editing_rows: sorted(&self.editing_rows),
            selected_rows: sorted(&self.selection),
            filters: self.filters.clone(),
            activity_log: self.log.clone(),
            saved_views: self.views.clone(),
            validation_errors: self.validation_errors.clone(),
            show_analytics: self.show_analytics,
        }
    }

    /// Replace all state from a persisted snapshot. Applies the legacy
    /// editability retrofit to columns and resets volatile editing state.
    pub fn restore(&mut self, snapshot: GridSnapshot) {
        let GridSnapshot {
            mut columns,
            rows,
            search,
            sort,
            page,
            page_size,
            editing_rows: _,
            selected_rows,
            filters,
            activity_log,
            saved_views,
            validation_errors,
            show_analytics,
        } = snapshot;

        columns.force_all_editable();
        self.columns = columns;
        self.store = rows;
        self.search = search;
        self.sort = sort;
        self.page = page;
        self.page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        self.editing_rows.clear();
        self.selection = selected_rows.into_iter().collect();
        self.filters = filters;
        self.log = activity_log;
        self.views = saved_views;
        self.validation_errors = validation_errors;
        self.show_analytics = show_analytics;
    }

    fn log_activity(&mut self, kind: ActivityKind, row_id: Option<String>, detail: String) {
        let entry = ActivityEntry {
            id: self.ids.next_id(),
            timestamp: self.clock.now(),
            kind,
            row_id,
            detail,
            actor: DEFAULT_ACTOR.to_string(),
        };
        self.log.append(entry);
    }
}

impl Default for DataGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataGrid {{ columns: {}, rows: {}, filters: {}, views: {}, page: {}/{} }}",
            self.columns.len(),
            self.store.len(),
            self.filters.len(),
            self.views.len(),
            self.page,
            self.page_size
        )
    }
}

fn sorted(set: &HashSet<String>) -> Vec<String> {
    let mut items: Vec<String> = set.iter().cloned().collect();
    items.sort();
    items
}
