//! Skip/limit pagination for list queries.

use serde::{Deserialize, Serialize};

/// Offset-based pagination controls.
///
/// A missing `limit` means "no limit"; callers clamp it against the
/// configured maximum with [`Pagination::clamped`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of leading items to skip.
    #[serde(default)]
    pub skip: u64,
    /// Maximum number of items to return.
    #[serde(default)]
    pub limit: Option<u64>,
}

impl Pagination {
    /// Create a new pagination window.
    pub fn new(skip: u64, limit: Option<u64>) -> Self {
        Self { skip, limit }
    }

    /// Return a copy whose limit never exceeds `max`.
    pub fn clamped(self, max: u64) -> Self {
        Self {
            skip: self.skip,
            limit: Some(self.limit.map_or(max, |l| l.min(max))),
        }
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        i64::try_from(self.skip).unwrap_or(i64::MAX)
    }

    /// Return the SQL `LIMIT` value, or `None` for `LIMIT ALL`.
    pub fn sql_limit(&self) -> Option<i64> {
        self.limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
    }

    /// Apply the window to an already ordered sequence.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let iter = items.into_iter().skip(skip);
        match self.limit {
            Some(limit) => iter
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => iter.collect(),
        }
    }
}
