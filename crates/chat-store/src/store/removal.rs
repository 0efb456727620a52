//! Outcome of a user removal

use serde::Serialize;

use chat_core::User;

/// State of one group after a member was removed from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRemoval {
    pub group: String,
    /// Participants left in the group
    pub participant_count: usize,
    /// Messages left in the group
    pub message_count: usize,
}

/// Everything a user removal changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalSummary {
    pub user: User,
    /// Groups the user was removed from, in creation order
    pub groups: Vec<GroupRemoval>,
    /// Messages deleted along with the user
    pub removed_messages: usize,
    /// Messages left in the whole store
    pub total_messages: usize,
}

impl RemovalSummary {
    /// Look up the outcome for a single group
    pub fn group(&self, name: &str) -> Option<&GroupRemoval> {
        self.groups.iter().find(|g| g.group == name)
    }

    /// Single-number diagnostic: participant count plus message count of every
    /// affected group, plus the store-wide message count
    pub fn legacy_code(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.participant_count + g.message_count)
            .sum::<usize>()
            + self.total_messages
    }
}
