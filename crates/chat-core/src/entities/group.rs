//! Group entity - a personal or group chat with its membership

use serde::{Deserialize, Serialize};

use crate::value_objects::GroupId;

/// Kind of chat a group was created as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// One-to-one chat, named after the non-admin member
    Personal,
    /// Multi-user chat, named "Group N"
    Group,
}

/// Group entity
///
/// Members are kept in join order and never contain duplicates. The admin is
/// recorded explicitly and is always one of the members. Only the store
/// builds groups, so there is no `Deserialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub kind: ChatKind,
    admin: String,
    members: Vec<String>,
}

impl Group {
    /// Create a new Group with `admin` as first member followed by `others`
    pub fn new(
        id: GroupId,
        name: String,
        kind: ChatKind,
        admin: String,
        others: Vec<String>,
    ) -> Self {
        let mut members = Vec::with_capacity(others.len() + 1);
        members.push(admin.clone());
        members.extend(others);

        Self {
            id,
            name,
            kind,
            admin,
            members,
        }
    }

    /// Mobile number of the current admin
    #[inline]
    pub fn admin(&self) -> &str {
        &self.admin
    }

    /// Members in join order
    #[inline]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of participants (always the membership length)
    #[inline]
    pub fn participant_count(&self) -> usize {
        self.members.len()
    }

    /// Check if a user is the group admin
    #[inline]
    pub fn is_admin(&self, mobile: &str) -> bool {
        self.admin == mobile
    }

    /// Check if a user is a member of the group
    pub fn is_member(&self, mobile: &str) -> bool {
        self.members.iter().any(|m| m == mobile)
    }

    /// Hand the admin role to an existing member
    ///
    /// Returns `false` and leaves the group untouched if `mobile` is not a member.
    pub fn transfer_admin(&mut self, mobile: &str) -> bool {
        if !self.is_member(mobile) {
            return false;
        }
        self.admin = mobile.to_string();
        true
    }

    /// Remove a non-admin member
    ///
    /// Returns `false` if `mobile` is the admin or not a member.
    pub fn remove_member(&mut self, mobile: &str) -> bool {
        if self.is_admin(mobile) {
            return false;
        }
        match self.members.iter().position(|m| m == mobile) {
            Some(pos) => {
                self.members.remove(pos);
                true
            }
            None => false,
        }
    }
}
