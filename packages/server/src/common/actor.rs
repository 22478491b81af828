use serde::{Deserialize, Serialize};

use super::UserId;

/// The user performing a membership mutation.
///
/// Passed explicitly into every mutation so the audit message names the
/// right person regardless of which task or request runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    user_id: Option<UserId>,
    name: String,
}

impl Actor {
    /// Create an actor for a known user.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            name: name.into(),
        }
    }

    /// Create an actor with only a display name (system jobs, API keys).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            name: name.into(),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
