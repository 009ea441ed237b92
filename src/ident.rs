/// GridStore Identity and Time Sources
///
/// Row, view, and activity identities come from an injectable generator so
/// tests can supply deterministic values; timestamps come from an
/// injectable clock for the same reason. Production code uses random UUIDs
/// and the system clock.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of fresh identities for rows, saved views, and log entries.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Default generator backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests: `prefix-1`, `prefix-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIdGenerator {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        SequentialIdGenerator::new("id")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Source of timestamps for saved views and log entries.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Default clock reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for tests; always returns the wrapped instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        FixedClock(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
