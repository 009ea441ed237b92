/// GridStore - In-Memory Tabular Data Manager
///
/// An in-memory table with dynamic, user-defined columns and the query
/// machinery around it: case-insensitive search, conjunctive multi-operator
/// filtering, stable sorting, clamped pagination, selection-driven bulk
/// mutation, immutable saved views, scoped export projections, and a
/// bounded activity log. Single-actor and fully synchronous; the host
/// persists a whole-state snapshot and owns rendering and file I/O.

pub mod activity;
pub mod column;
pub mod error;
pub mod export;
pub mod filter;
pub mod grid;
pub mod ident;
pub mod query;
pub mod row;
pub mod validate;
pub mod value;
pub mod views;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog, DEFAULT_ACTOR, LOG_CAPACITY};
pub use column::{ColumnDef, ColumnKind, ColumnRegistry, ValidationRules};
pub use error::{GridError, Result};
pub use export::{ExportScope, Projection, ProjectionColumn};
pub use filter::{Filter, FilterOp};
pub use grid::{DataGrid, GridSnapshot};
pub use ident::{Clock, FixedClock, IdGenerator, SequentialIdGenerator, SystemClock, UuidGenerator};
pub use query::{SortDirection, SortSpec};
pub use row::{Fields, Row, RowStore};
pub use validate::ValidationIssue;
pub use value::CellValue;
pub use views::{SavedView, ViewStore};
