//! Store error types
//!
//! Provides a unified error type for all store operations.

use chat_common::AppError;
use chat_core::{DomainError, ErrorKind};

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Domain rule violation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Indices disagree with each other
    #[error("Store indices out of sync: {0}")]
    Corrupted(String),
}

impl StoreError {
    /// Create a corrupted-state error
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// Category of the underlying domain error, if any
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Domain(e) => Some(e.kind()),
            Self::Corrupted(_) => None,
        }
    }

    /// Get the error code for responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Corrupted(_) => "STORE_CORRUPTED",
        }
    }

    fn domain_is(&self, check: impl Fn(&DomainError) -> bool) -> bool {
        matches!(self, Self::Domain(e) if check(e))
    }

    pub fn is_not_found(&self) -> bool {
        self.domain_is(DomainError::is_not_found)
    }

    pub fn is_duplicate(&self) -> bool {
        self.domain_is(DomainError::is_conflict)
    }

    pub fn is_permission_denied(&self) -> bool {
        self.domain_is(DomainError::is_authorization)
    }

    pub fn is_range(&self) -> bool {
        self.domain_is(DomainError::is_range)
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.domain_is(DomainError::is_validation)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => AppError::Domain(e),
            StoreError::Corrupted(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
