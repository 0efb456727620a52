//! # chat-store
//!
//! In-memory store for users, chats and messages. Keeps the registry, the
//! group arena, membership and the per-group / per-user message indices
//! consistent under every operation.

pub mod error;
pub mod service;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use service::{ChatService, SUCCESS};
pub use store::{ChatStore, GroupRemoval, RemovalSummary};
