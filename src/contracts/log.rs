//! Per-user activity logging

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive time window for log queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// First instant included
    pub begin: DateTime<Utc>,
    /// Last instant included
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Window from `begin` to `end`; the bounds are swapped if reversed
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if begin <= end {
            Self { begin, end }
        } else {
            Self { begin: end, end: begin }
        }
    }

    /// Whether `at` falls inside the window
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.begin <= at && at <= self.end
    }
}

/// Records user activity and answers queries over it
///
/// Two stores are addressed: a local log and a database-backed one.
/// Queries return the matching entries rendered as text.
pub trait LogHandler: Send + Sync {
    /// Append an activity to the local log
    fn log_message(&self, user: &str, activity: &str);

    /// Append an activity to the database log
    fn store_log_in_db(&self, user: &str, activity: &str);

    /// Local log entries of `user` within `range`
    fn get_logs(&self, range: &TimeRange, user: &str) -> String;

    /// Database log entries of `user` within `range`
    fn get_logs_from_db(&self, range: &TimeRange, user: &str) -> String;
}
