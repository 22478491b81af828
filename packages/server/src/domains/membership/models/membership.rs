use serde::{Deserialize, Serialize};

use crate::common::{MembershipId, ProjectId, RoleId, UserId, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// A role held through a membership.
///
/// `inherited_from` points at the group or parent-project membership the
/// role was copied from; such roles cannot be removed on this membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRole {
    pub role: Role,
    pub inherited_from: Option<MembershipId>,
}

impl MemberRole {
    pub fn direct(role: Role) -> Self {
        Self {
            role,
            inherited_from: None,
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited_from.is_some()
    }
}

/// A user's seat in a project, with the roles it grants.
///
/// `user` is `None` for the placeholder membership created when an add
/// request names no users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub project: Project,
    pub user: Option<User>,
    pub roles: Vec<MemberRole>,
}

impl Membership {
    /// Role names in assignment order.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.role.name.clone()).collect()
    }

    pub fn is_placeholder(&self) -> bool {
        self.user.is_none()
    }

    /// A membership holding any inherited role is managed elsewhere and
    /// cannot be deleted directly.
    pub fn is_deletable(&self) -> bool {
        !self.roles.iter().any(MemberRole::is_inherited)
    }

    /// Model-level checks run before every save.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.roles.is_empty() {
            errors.add("role", "can't be empty");
        }
        errors.into_result()
    }

    /// Replace the directly assigned roles, keeping inherited ones.
    ///
    /// Inherited roles stay first; the new roles follow in the order given.
    pub fn assign_roles(&mut self, roles: Vec<Role>) {
        let mut assigned: Vec<MemberRole> = self
            .roles
            .drain(..)
            .filter(MemberRole::is_inherited)
            .collect();

        for role in roles {
            if !assigned.iter().any(|r| r.role.id == role.id) {
                assigned.push(MemberRole::direct(role));
            }
        }

        self.roles = assigned;
    }
}

/// A membership requested but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub user_id: Option<UserId>,
    pub role_ids: Vec<RoleId>,
}

impl NewMembership {
    pub fn new(user_id: Option<UserId>, role_ids: Vec<RoleId>) -> Self {
        Self { user_id, role_ids }
    }

    /// Model-level checks that do not need the store.
    pub fn validate(&self, errors: &mut ValidationErrors) {
        if self.role_ids.is_empty() {
            errors.add("role", "can't be empty");
        }
    }
}
