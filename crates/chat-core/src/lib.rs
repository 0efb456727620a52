//! # chat-core
//!
//! Domain layer containing entities, value objects, and domain errors.
//! This crate has zero dependencies on infrastructure (locking, configuration, logging).

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{ChatKind, Group, Message, User};
pub use error::{DomainError, ErrorKind};
pub use value_objects::{GroupId, MessageId};
