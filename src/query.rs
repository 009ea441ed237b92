/// GridStore Query Pipeline
///
/// The pure transformation at the heart of the grid: search, then filters,
/// then sort, applied to the live row collection on every read. There is
/// no caching and no incremental maintenance; a read always recomputes all
/// three stages against the current store. That keeps reads trivially
/// consistent with the latest write and is the intended tradeoff for
/// in-memory datasets of moderate size.
///
/// Pagination slices the pipeline's output into a zero-based, clamped
/// window and never fails on an out-of-range page.
///
/// # Examples
///
/// ```
/// use gridstore::{query, CellValue, ColumnKind, ColumnRegistry, Row, SortSpec, SortDirection};
///
/// let mut columns = ColumnRegistry::default();
/// columns.add("Name", ColumnKind::Text, Vec::new()).unwrap();
///
/// let rows = vec![
///     Row::new("r1", [("name".to_string(), CellValue::Text("Bob".into()))].into()),
///     Row::new("r2", [("name".to_string(), CellValue::Text("Alice".into()))].into()),
/// ];
///
/// let sort = SortSpec { column: "name".to_string(), direction: SortDirection::Ascending };
/// let matched = query::run(&rows, &columns, "", &[], Some(&sort));
/// assert_eq!(matched[0].id, "r2");
/// ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::column::ColumnRegistry;
use crate::filter::Filter;
use crate::row::Row;
use crate::value::CellValue;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// Active sort: one column, one direction. Absent means insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Run the full pipeline: search -> filters -> sort.
///
/// Returns references into `rows` in result order. Filtering only ever
/// removes rows; the sort is stable, so equal keys keep their prior
/// relative order.
pub fn run<'a>(
    rows: &'a [Row],
    columns: &ColumnRegistry,
    search: &str,
    filters: &[Filter],
    sort: Option<&SortSpec>,
) -> Vec<&'a Row> {
    let mut matched: Vec<&Row> = rows
        .iter()
        .filter(|row| matches_search(row, columns, search))
        .filter(|row| filters.iter().all(|f| f.matches(row)))
        .collect();

    if let Some(spec) = sort {
        matched.sort_by(|a, b| {
            let ord = compare_cells(a.value(&spec.column), b.value(&spec.column));
            match spec.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    matched
}

/// Search stage: with a non-empty search string, keep a row iff any
/// visible column's display string contains it case-insensitively.
fn matches_search(row: &Row, columns: &ColumnRegistry, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    columns
        .visible()
        .iter()
        .any(|col| row.value(&col.id).display_string().to_lowercase().contains(&needle))
}

/// Ordering used by the sort stage: when both cells coerce to numbers the
/// comparison is numeric, otherwise display strings compare lexically.
/// Absent cells stringify to "" and therefore sort before non-empty text.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    let (na, nb) = (a.coerce_number(), b.coerce_number());
    if !na.is_nan() && !nb.is_nan() {
        return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
    }
    a.display_string().cmp(&b.display_string())
}

/// Slice a result sequence into the zero-based page window
/// `[page*page_size, page*page_size + page_size)`, clamped to the input
/// bounds. An out-of-range page yields an empty slice, never a panic.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &items[..0];
    }
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
