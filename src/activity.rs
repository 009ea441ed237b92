/// GridStore Activity Log
///
/// Append-only, bounded record of mutating operations for audit display.
/// Entries are kept newest-first and the log holds at most the most recent
/// 1000; older entries fall off the end. The actor is a constant
/// placeholder because there is no authentication in this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor recorded on every entry.
pub const DEFAULT_ACTOR: &str = "local-user";

/// Maximum number of retained entries.
pub const LOG_CAPACITY: usize = 1000;

/// Kind of mutating operation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Create,
    Update,
    Delete,
    Import,
    Export,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    pub detail: String,
    pub actor: String,
}

/// Bounded newest-first entry list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    /// Prepend an entry and drop the oldest beyond capacity.
    pub fn append(&mut self, entry: ActivityEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
