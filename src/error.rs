/// GridStore Error Types
///
/// Everything here is recoverable and reported inline to the initiating
/// call. Operations on identities that no longer exist are silent no-ops by
/// design and deliberately have no variant; a declined export is an `Err`
/// the caller surfaces, not a fault.

use thiserror::Error;

use crate::export::ExportScope;

/// Core error type for grid operations.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("column label cannot be empty")]
    EmptyColumnLabel,

    #[error("a column labeled '{0}' already exists")]
    DuplicateColumn(String),

    #[error("select column '{0}' requires at least one option")]
    MissingOptions(String),

    #[error("invalid validation pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("nothing to export: scope '{0}' matched no rows")]
    EmptyExport(ExportScope),

    #[error("an export file name is required")]
    MissingExportName,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
