//! Domain errors - error types for the domain layer

use serde::Serialize;
use thiserror::Error;

use crate::value_objects::MessageId;

/// Broad category of a domain error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    DuplicateEntity,
    PermissionDenied,
    RangeError,
    InvalidArgument,
}

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("User {0} is not a member of any group")]
    NotInAnyGroup(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("Group already exists: {0}")]
    DuplicateGroup(String),

    #[error("User listed more than once: {0}")]
    DuplicateMember(String),

    #[error("Message already sent: {0}")]
    MessageAlreadySent(MessageId),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("User {user} is not a participant of {group}")]
    NotGroupMember { user: String, group: String },

    #[error("User {user} is not the admin of {group}")]
    NotGroupAdmin { user: String, group: String },

    #[error("Cannot remove admin of {0} (transfer admin first)")]
    CannotRemoveAdmin(String),

    // =========================================================================
    // Range / Argument Errors
    // =========================================================================
    #[error("Not enough messages: requested {requested}, found {available}")]
    NotEnoughResults { requested: usize, available: usize },

    #[error("Rank must be at least 1")]
    ZeroRank,

    #[error("A chat needs at least one other participant")]
    EmptyParticipants,
}

impl DomainError {
    /// Get the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_)
            | Self::GroupNotFound(_)
            | Self::MessageNotFound(_)
            | Self::NotInAnyGroup(_) => ErrorKind::NotFound,

            Self::DuplicateUser(_)
            | Self::DuplicateGroup(_)
            | Self::DuplicateMember(_)
            | Self::MessageAlreadySent(_) => ErrorKind::DuplicateEntity,

            Self::NotGroupMember { .. } | Self::NotGroupAdmin { .. } | Self::CannotRemoveAdmin(_) => {
                ErrorKind::PermissionDenied
            }

            Self::NotEnoughResults { .. } | Self::ZeroRank => ErrorKind::RangeError,
            Self::EmptyParticipants => ErrorKind::InvalidArgument,
        }
    }

    /// Get an error code string for responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::GroupNotFound(_) => "UNKNOWN_GROUP",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::NotInAnyGroup(_) => "NOT_IN_ANY_GROUP",

            // Conflict
            Self::DuplicateUser(_) => "USER_ALREADY_EXISTS",
            Self::DuplicateGroup(_) => "GROUP_ALREADY_EXISTS",
            Self::DuplicateMember(_) => "DUPLICATE_MEMBER",
            Self::MessageAlreadySent(_) => "MESSAGE_ALREADY_SENT",

            // Authorization
            Self::NotGroupMember { .. } => "NOT_GROUP_MEMBER",
            Self::NotGroupAdmin { .. } => "NOT_GROUP_ADMIN",
            Self::CannotRemoveAdmin(_) => "CANNOT_REMOVE_ADMIN",

            // Range / Argument
            Self::NotEnoughResults { .. } => "NOT_ENOUGH_RESULTS",
            Self::ZeroRank => "INVALID_RANK",
            Self::EmptyParticipants => "EMPTY_PARTICIPANTS",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a duplicate-entity error
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::DuplicateEntity
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }

    /// Check if this is a range error
    pub fn is_range(&self) -> bool {
        self.kind() == ErrorKind::RangeError
    }

    /// Check if this is an invalid-argument error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }
}
