//! Store state - entities and the indices kept consistent across them
//!
//! Every operation validates fully before its first write, so a failed call
//! leaves all indices untouched.

use std::collections::{BTreeMap, HashMap, HashSet};

use chat_common::StoreConfig;
use chat_core::{ChatKind, DomainError, Group, GroupId, Message, MessageId, User};
use chrono::{DateTime, Utc};

use super::removal::{GroupRemoval, RemovalSummary};
use super::search;
use crate::error::{StoreError, StoreResult};

#[derive(Debug)]
pub(crate) struct StoreState {
    /// Registry: mobile -> user
    users: HashMap<String, User>,
    /// Group arena, indexed by `GroupId`
    groups: Vec<Group>,
    group_names: HashMap<String, GroupId>,
    /// Every live message, routed or not
    messages: BTreeMap<MessageId, Message>,
    group_messages: HashMap<GroupId, Vec<MessageId>>,
    /// Sender mobile -> messages they sent
    user_messages: HashMap<String, Vec<MessageId>>,
    /// Routed message -> the group it was sent to
    message_groups: HashMap<MessageId, GroupId>,
    next_message_id: MessageId,
    group_chat_count: u64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            groups: Vec::new(),
            group_names: HashMap::new(),
            messages: BTreeMap::new(),
            group_messages: HashMap::new(),
            user_messages: HashMap::new(),
            message_groups: HashMap::new(),
            next_message_id: MessageId::FIRST,
            group_chat_count: 0,
        }
    }
}

impl StoreState {
    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn user(&self, mobile: &str) -> Option<&User> {
        self.users.get(mobile)
    }

    fn require_user(&self, mobile: &str) -> Result<&User, DomainError> {
        self.users
            .get(mobile)
            .ok_or_else(|| DomainError::UserNotFound(mobile.to_string()))
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.group_names
            .get(name)
            .and_then(|id| self.groups.get(id.index()))
    }

    fn require_group_id(&self, name: &str) -> StoreResult<GroupId> {
        let id = *self
            .group_names
            .get(name)
            .ok_or_else(|| DomainError::GroupNotFound(name.to_string()))?;
        if id.index() >= self.groups.len() {
            return Err(StoreError::corrupted(format!(
                "group name {name} points at missing slot {id}"
            )));
        }
        Ok(id)
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub fn group_messages(&self, name: &str) -> StoreResult<Vec<&Message>> {
        let id = self.require_group_id(name)?;
        Ok(self.resolve_messages(self.group_messages.get(&id)))
    }

    pub fn user_messages(&self, mobile: &str) -> StoreResult<Vec<&Message>> {
        self.require_user(mobile)?;
        Ok(self.resolve_messages(self.user_messages.get(mobile)))
    }

    fn resolve_messages(&self, ids: Option<&Vec<MessageId>>) -> Vec<&Message> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.messages.get(id))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn create_user(&mut self, name: &str, mobile: &str) -> Result<User, DomainError> {
        if self.users.contains_key(mobile) {
            return Err(DomainError::DuplicateUser(mobile.to_string()));
        }
        let user = User::new(name, mobile);
        self.users.insert(mobile.to_string(), user.clone());
        Ok(user)
    }

    // =========================================================================
    // Chats
    // =========================================================================

    /// Create a personal chat (one other user) or a group chat (several)
    pub fn create_chat<S: AsRef<str>>(
        &mut self,
        config: &StoreConfig,
        admin: &str,
        others: &[S],
    ) -> StoreResult<Group> {
        if others.is_empty() {
            return Err(DomainError::EmptyParticipants.into());
        }

        // Resolve everyone against the registry before touching anything
        let admin = self.require_user(admin)?.mobile.clone();
        let mut seen: HashSet<&str> = HashSet::with_capacity(others.len() + 1);
        seen.insert(&admin);

        let mut members = Vec::with_capacity(others.len());
        for other in others {
            let user = self.require_user(other.as_ref())?;
            if !seen.insert(&user.mobile) {
                return Err(DomainError::DuplicateMember(user.mobile.clone()).into());
            }
            members.push(user);
        }

        let (kind, name, number) = match members.as_slice() {
            [only] => (ChatKind::Personal, only.name.clone(), None),
            _ => {
                let (number, name) = self.next_group_name(config);
                (ChatKind::Group, name, Some(number))
            }
        };
        if self.group_names.contains_key(&name) {
            return Err(DomainError::DuplicateGroup(name).into());
        }
        let members: Vec<String> = members.into_iter().map(|u| u.mobile.clone()).collect();

        if let Some(number) = number {
            self.group_chat_count = number;
        }

        let id = GroupId::new(self.groups.len());
        let group = Group::new(id, name.clone(), kind, admin, members);
        self.groups.push(group.clone());
        self.group_names.insert(name, id);
        self.group_messages.insert(id, Vec::new());

        Ok(group)
    }

    /// First free generated name after the last group chat
    ///
    /// Personal chats are named after users, so a taken "Group N" is skipped.
    fn next_group_name(&self, config: &StoreConfig) -> (u64, String) {
        let mut number = self.group_chat_count + 1;
        loop {
            let name = config.group_name(number);
            if !self.group_names.contains_key(&name) {
                return (number, name);
            }
            number += 1;
        }
    }

    pub fn change_admin(&mut self, approver: &str, user: &str, group: &str) -> StoreResult<()> {
        let id = self.require_group_id(group)?;
        self.require_user(approver)?;
        self.require_user(user)?;

        let group = &mut self.groups[id.index()];
        if !group.is_member(user) {
            return Err(DomainError::NotGroupMember {
                user: user.to_string(),
                group: group.name.clone(),
            }
            .into());
        }
        if !group.is_admin(approver) {
            return Err(DomainError::NotGroupAdmin {
                user: approver.to_string(),
                group: group.name.clone(),
            }
            .into());
        }

        group.transfer_admin(user);
        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    pub fn create_message(&mut self, content: String) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id = id.next();
        self.messages.insert(id, Message::new(id, content));
        id
    }

    /// Route a created message into a group; returns the group's message count
    pub fn send_message(
        &mut self,
        message: MessageId,
        sender: &str,
        group: &str,
    ) -> StoreResult<usize> {
        let id = self.require_group_id(group)?;
        self.require_user(sender)?;

        let group = &self.groups[id.index()];
        if !group.is_member(sender) {
            return Err(DomainError::NotGroupMember {
                user: sender.to_string(),
                group: group.name.clone(),
            }
            .into());
        }
        if !self.messages.contains_key(&message) {
            return Err(DomainError::MessageNotFound(message).into());
        }
        if self.message_groups.contains_key(&message) {
            return Err(DomainError::MessageAlreadySent(message).into());
        }

        self.user_messages
            .entry(sender.to_string())
            .or_default()
            .push(message);
        self.message_groups.insert(message, id);
        let in_group = self.group_messages.entry(id).or_default();
        in_group.push(message);

        Ok(in_group.len())
    }

    pub fn find_message(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        k: usize,
    ) -> Result<&Message, DomainError> {
        search::kth_most_recent(self.messages.values(), start, end, k)
    }

    pub fn recent_messages(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Vec<&Message> {
        search::most_recent(self.messages.values(), start, end, limit)
    }

    // =========================================================================
    // Removal cascade
    // =========================================================================

    /// Remove a user, their messages, and their memberships
    pub fn remove_user(&mut self, mobile: &str) -> StoreResult<RemovalSummary> {
        let user = self.require_user(mobile)?.clone();

        let affected: Vec<GroupId> = self
            .groups
            .iter()
            .filter(|g| g.is_member(mobile))
            .map(|g| g.id)
            .collect();
        if affected.is_empty() {
            return Err(DomainError::NotInAnyGroup(mobile.to_string()).into());
        }
        if let Some(group) = self.groups.iter().find(|g| g.is_admin(mobile)) {
            return Err(DomainError::CannotRemoveAdmin(group.name.clone()).into());
        }

        // Validation done; from here on nothing can fail
        self.users.remove(mobile);
        let sent = self.user_messages.remove(mobile).unwrap_or_default();
        let sent_set: HashSet<MessageId> = sent.iter().copied().collect();

        let mut touched: HashSet<GroupId> = HashSet::new();
        for id in &sent {
            self.messages.remove(id);
            if let Some(group_id) = self.message_groups.remove(id) {
                touched.insert(group_id);
            }
        }
        for group_id in touched {
            if let Some(ids) = self.group_messages.get_mut(&group_id) {
                ids.retain(|id| !sent_set.contains(id));
            }
        }

        let mut groups = Vec::with_capacity(affected.len());
        for id in affected {
            let group = &mut self.groups[id.index()];
            group.remove_member(mobile);
            groups.push(GroupRemoval {
                group: group.name.clone(),
                participant_count: group.participant_count(),
                message_count: self.group_messages.get(&id).map_or(0, Vec::len),
            });
        }

        Ok(RemovalSummary {
            user,
            groups,
            removed_messages: sent.len(),
            total_messages: self.messages.len(),
        })
    }

    // =========================================================================
    // Consistency
    // =========================================================================

    /// Cross-check every index against the others
    pub fn verify(&self) -> StoreResult<()> {
        if self.group_names.len() != self.groups.len() {
            return Err(StoreError::corrupted(format!(
                "{} group names for {} groups",
                self.group_names.len(),
                self.groups.len()
            )));
        }

        for (index, group) in self.groups.iter().enumerate() {
            if group.id.index() != index || self.group_names.get(&group.name) != Some(&group.id) {
                return Err(StoreError::corrupted(format!("group {} is misindexed", group.name)));
            }
            if group.members().is_empty() || !group.is_member(group.admin()) {
                return Err(StoreError::corrupted(format!(
                    "admin of {} is not a member",
                    group.name
                )));
            }
            let unique: HashSet<&String> = group.members().iter().collect();
            if unique.len() != group.participant_count() {
                return Err(StoreError::corrupted(format!(
                    "{} lists a member twice",
                    group.name
                )));
            }
            if let Some(missing) = group.members().iter().find(|m| !self.users.contains_key(*m)) {
                return Err(StoreError::corrupted(format!(
                    "{} lists unregistered member {missing}",
                    group.name
                )));
            }
        }

        let mut routed_in_groups = 0;
        for (group_id, ids) in &self.group_messages {
            for id in ids {
                if !self.messages.contains_key(id) || self.message_groups.get(id) != Some(group_id) {
                    return Err(StoreError::corrupted(format!(
                        "message {id} is misrouted in group {group_id}"
                    )));
                }
                routed_in_groups += 1;
            }
        }

        let mut routed_by_users = 0;
        for (mobile, ids) in &self.user_messages {
            if !self.users.contains_key(mobile) {
                return Err(StoreError::corrupted(format!(
                    "messages indexed under removed user {mobile}"
                )));
            }
            if let Some(id) = ids.iter().find(|id| !self.messages.contains_key(*id)) {
                return Err(StoreError::corrupted(format!(
                    "user {mobile} indexes deleted message {id}"
                )));
            }
            routed_by_users += ids.len();
        }

        let routed = self.message_groups.len();
        if routed_in_groups != routed || routed_by_users != routed {
            return Err(StoreError::corrupted(format!(
                "{routed} routed messages, {routed_in_groups} in groups, {routed_by_users} by senders"
            )));
        }

        Ok(())
    }
}
