//! Request context carrying the acting owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arbor_core::types::UserId;

/// Context for the current request.
///
/// Established by the caller's authentication layer and passed into every
/// service method so each operation knows *whose* hierarchy it acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated owner.
    pub owner_id: UserId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner_id: UserId) -> Self {
        Self {
            owner_id,
            request_time: Utc::now(),
        }
    }
}

impl From<UserId> for RequestContext {
    fn from(owner_id: UserId) -> Self {
        Self::new(owner_id)
    }
}
