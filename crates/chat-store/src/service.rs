//! Chat service
//!
//! Entity-level entry points for a request layer. Callers hand in the
//! entities they hold (possibly stale copies); the service resolves them by
//! key against the store.

use chat_core::{DomainError, Group, Message, MessageId, User};
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::error::StoreResult;
use crate::store::ChatStore;

/// Acknowledgement returned by operations that have no other result
pub const SUCCESS: &str = "SUCCESS";

/// Chat service
pub struct ChatService<'a> {
    store: &'a ChatStore,
}

impl<'a> ChatService<'a> {
    /// Create a new ChatService
    pub fn new(store: &'a ChatStore) -> Self {
        Self { store }
    }

    pub fn create_user(&self, name: &str, mobile: &str) -> StoreResult<&'static str> {
        self.store.create_user(name, mobile)?;
        Ok(SUCCESS)
    }

    /// Create a chat from a participant list whose first entry is the admin
    #[instrument(skip(self, users), fields(participants = users.len()))]
    pub fn create_group(&self, users: &[User]) -> StoreResult<Group> {
        let (admin, others) = users
            .split_first()
            .ok_or(DomainError::EmptyParticipants)?;
        let others: Vec<&str> = others.iter().map(|u| u.mobile.as_str()).collect();

        self.store.create_chat(&admin.mobile, &others)
    }

    pub fn create_message(&self, content: &str) -> MessageId {
        self.store.create_message(content)
    }

    pub fn send_message(
        &self,
        message: &Message,
        sender: &User,
        group: &Group,
    ) -> StoreResult<usize> {
        self.store.send_message(message.id, &sender.mobile, &group.name)
    }

    pub fn change_admin(
        &self,
        approver: &User,
        user: &User,
        group: &Group,
    ) -> StoreResult<&'static str> {
        self.store.change_admin(&approver.mobile, &user.mobile, &group.name)?;
        Ok(SUCCESS)
    }

    /// Remove a user; returns the single-number removal diagnostic
    pub fn remove_user(&self, user: &User) -> StoreResult<usize> {
        let summary = self.store.remove_user(&user.mobile)?;
        Ok(summary.legacy_code())
    }

    pub fn find_message(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        k: usize,
    ) -> StoreResult<String> {
        self.store.find_message(start, end, k)
    }
}
