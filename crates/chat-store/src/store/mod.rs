//! Chat store
//!
//! Owns every user, group and message together with the indices between them.
//! All state sits behind one `RwLock`: each mutation holds the write guard for
//! its whole duration, so no reader ever sees a half-applied operation.

mod removal;
mod search;
mod state;

use std::sync::Arc;

use chat_common::StoreConfig;
use chat_core::{Group, Message, MessageId, User};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::StoreResult;
use state::StoreState;

pub use removal::{GroupRemoval, RemovalSummary};

/// In-memory chat store
#[derive(Debug)]
pub struct ChatStore {
    config: StoreConfig,
    state: RwLock<StoreState>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStore {
    /// Create an empty store with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Create an empty store wrapped in Arc
    #[must_use]
    pub fn new_shared(config: StoreConfig) -> Arc<Self> {
        Arc::new(Self::with_config(config))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a user; the mobile number must not be taken
    #[instrument(skip(self))]
    pub fn create_user(&self, name: &str, mobile: &str) -> StoreResult<User> {
        let user = self
            .state
            .write()
            .create_user(name, mobile)
            .inspect_err(|e| debug!(error = %e, code = e.code(), "User rejected"))?;

        info!(mobile = %user.mobile, "User created");
        Ok(user)
    }

    pub fn user(&self, mobile: &str) -> Option<User> {
        self.state.read().user(mobile).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.state.read().user_count()
    }

    // =========================================================================
    // Chats
    // =========================================================================

    /// Create a chat administered by `admin`
    ///
    /// With exactly one other user this is a personal chat named after that
    /// user; otherwise a group chat named from the configured prefix and the
    /// number of group chats created so far.
    #[instrument(skip(self, others), fields(invited = others.len()))]
    pub fn create_chat<S: AsRef<str>>(&self, admin: &str, others: &[S]) -> StoreResult<Group> {
        let group = self
            .state
            .write()
            .create_chat(&self.config, admin, others)
            .inspect_err(|e| debug!(error = %e, code = e.error_code(), "Chat rejected"))?;

        info!(
            group = %group.name,
            kind = ?group.kind,
            participants = group.participant_count(),
            "Chat created"
        );
        Ok(group)
    }

    pub fn group(&self, name: &str) -> Option<Group> {
        self.state.read().group(name).cloned()
    }

    /// Registry record of a group's admin
    pub fn admin(&self, group: &str) -> Option<User> {
        let state = self.state.read();
        state
            .group(group)
            .and_then(|g| state.user(g.admin()))
            .cloned()
    }

    pub fn group_count(&self) -> usize {
        self.state.read().group_count()
    }

    /// Move the admin role of `group` from `approver` to `user`
    #[instrument(skip(self))]
    pub fn change_admin(&self, approver: &str, user: &str, group: &str) -> StoreResult<()> {
        self.state
            .write()
            .change_admin(approver, user, group)
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "Admin change refused"))?;

        info!(group = %group, new_admin = %user, "Admin changed");
        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Compose a message that is not yet attached to any group
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn create_message(&self, content: &str) -> MessageId {
        let id = self.state.write().create_message(content.to_string());
        debug!(message_id = %id, "Message created");
        id
    }

    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.state.read().message(id).cloned()
    }

    pub fn message_count(&self) -> usize {
        self.state.read().message_count()
    }

    /// Route a created message from `sender` into `group`
    ///
    /// Returns the number of messages in the group after this send.
    #[instrument(skip(self))]
    pub fn send_message(
        &self,
        message: MessageId,
        sender: &str,
        group: &str,
    ) -> StoreResult<usize> {
        let count = self
            .state
            .write()
            .send_message(message, sender, group)
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "Send refused"))?;

        debug!(group_messages = count, "Message sent");
        Ok(count)
    }

    /// Messages routed into a group, in send order
    pub fn group_messages(&self, group: &str) -> StoreResult<Vec<Message>> {
        let state = self.state.read();
        Ok(state.group_messages(group)?.into_iter().cloned().collect())
    }

    /// Messages a user has sent, in send order
    pub fn user_messages(&self, mobile: &str) -> StoreResult<Vec<Message>> {
        let state = self.state.read();
        Ok(state.user_messages(mobile)?.into_iter().cloned().collect())
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove a user together with everything they sent
    ///
    /// Fails if the user administers any group; the admin role has to be
    /// handed over first.
    #[instrument(skip(self))]
    pub fn remove_user(&self, mobile: &str) -> StoreResult<RemovalSummary> {
        let summary = self
            .state
            .write()
            .remove_user(mobile)
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "Removal refused"))?;

        info!(
            groups = summary.groups.len(),
            removed_messages = summary.removed_messages,
            total_messages = summary.total_messages,
            "User removed"
        );
        Ok(summary)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Content of the `k`-th most recent message created strictly between
    /// `start` and `end`
    #[instrument(skip(self))]
    pub fn find_message(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        k: usize,
    ) -> StoreResult<String> {
        let state = self.state.read();
        let message = state.find_message(start, end, k)?;
        Ok(message.content.clone())
    }

    /// Up to `limit` messages created strictly between `start` and `end`,
    /// most recent first
    pub fn recent_messages(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Vec<Message> {
        self.state
            .read()
            .recent_messages(start, end, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    // =========================================================================
    // Consistency
    // =========================================================================

    /// Check that every index agrees with the others
    pub fn verify(&self) -> StoreResult<()> {
        self.state
            .read()
            .verify()
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "Consistency check failed"))
    }
}
