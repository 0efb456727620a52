//! Store-assigned identifiers
//!
//! - `MessageId`: sequential, 1-based, never reused
//! - `GroupId`: stable handle into the store's group arena

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential message identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// The first id handed out by a fresh store
    pub const FIRST: Self = Self(1);

    /// Create a MessageId from a raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The id that follows this one
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a group inside the store's arena
///
/// Every index that refers to a group holds this handle rather than a copy
/// of the group record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(usize);

impl GroupId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the group in the arena
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
