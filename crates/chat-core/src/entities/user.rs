//! User entity - represents a registered chat user

use serde::{Deserialize, Serialize};

/// User entity, identified by mobile number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub mobile: String,
}

impl User {
    /// Create a new User
    pub fn new(name: impl Into<String>, mobile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mobile: mobile.into(),
        }
    }
}
