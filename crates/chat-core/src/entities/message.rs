//! Message entity - represents a composed chat message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::MessageId;

/// Message entity
///
/// Created unattached; routing to a group and sender is recorded by the
/// store's indices, not on the message itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message stamped with the current time
    pub fn new(id: MessageId, content: String) -> Self {
        Self {
            id,
            content,
            created_at: Utc::now(),
        }
    }

    /// Check if the message was created strictly between `start` and `end`
    #[inline]
    pub fn is_within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.created_at > start && self.created_at < end
    }
}
