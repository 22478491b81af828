use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::ProjectId;

/// What happened to a membership - FACT ONLY
///
/// Failed mutations never produce an action; errors go in `Result::Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipAction {
    /// A user was added to the project
    AddMember,

    /// A member's roles were reassigned; names are post-update, in assignment order
    UpdateMember { role_names: Vec<String> },

    /// A member was removed (or removal was attempted)
    DeleteMember,
}

impl MembershipAction {
    /// Wire label consumed downstream. Casing differs per action and must stay as is.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddMember => "add member",
            Self::UpdateMember { .. } => "Update member",
            Self::DeleteMember => "delete member",
        }
    }
}

/// Immutable record of one membership mutation.
///
/// `occurred_at` is captured when the fact is built, so the rendered message
/// does not drift if publishing is slow.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct MembershipChangeFact {
    project_id: ProjectId,
    #[builder(setter(into))]
    project_name: String,
    #[builder(setter(into))]
    member_name: String,
    #[builder(default)]
    member_phone: Option<String>,
    #[builder(setter(into))]
    actor_name: String,
    action: MembershipAction,
    occurred_at: DateTime<Utc>,
}

impl MembershipChangeFact {
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn member_phone(&self) -> Option<&str> {
        self.member_phone.as_deref()
    }

    pub fn actor_name(&self) -> &str {
        &self.actor_name
    }

    pub fn action(&self) -> &MembershipAction {
        &self.action
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
