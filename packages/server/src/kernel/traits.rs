// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Membership rules (placeholder handling, notify ordering) live in the domain
// actions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseMembershipStore, BaseClock)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{LookupError, MembershipId, ProjectId, RoleId, StoreError};
use crate::domains::membership::models::{Membership, NewMembership, Role, User};

// =============================================================================
// Membership Store Trait (Infrastructure - persistence)
// =============================================================================

#[async_trait]
pub trait BaseMembershipStore: Send + Sync {
    /// Find a membership, scoped to a project
    async fn find_membership(
        &self,
        project_id: ProjectId,
        id: MembershipId,
    ) -> Result<Option<Membership>, StoreError>;

    /// Find a membership by id alone
    async fn find_membership_by_id(&self, id: MembershipId)
        -> Result<Option<Membership>, StoreError>;

    /// Persist a batch of new memberships for a project, in request order.
    /// Returns `StoreError::Validation` when any record is rejected; nothing
    /// is persisted in that case.
    async fn create_memberships(
        &self,
        project_id: ProjectId,
        specs: Vec<NewMembership>,
    ) -> Result<Vec<Membership>, StoreError>;

    /// Save a membership's current role assignment
    async fn save_membership(&self, membership: &Membership) -> Result<Membership, StoreError>;

    /// Delete a membership
    async fn delete_membership(&self, membership: &Membership) -> Result<(), StoreError>;

    /// Resolve role ids to assignable roles, in the order given.
    /// Ids that are unknown or not assignable are skipped.
    async fn resolve_roles(&self, role_ids: &[RoleId]) -> Result<Vec<Role>, StoreError>;
}

// =============================================================================
// User Directory Trait (Infrastructure - custom attributes)
// =============================================================================

/// Handle to a custom attribute definition, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    pub id: i64,
    pub name: String,
}

#[async_trait]
pub trait BaseUserDirectory: Send + Sync {
    /// Look up an attribute definition by its display name
    async fn resolve_attribute(&self, name: &str) -> Result<AttributeKey, LookupError>;

    /// Read a user's value for an attribute. `Ok(None)` when unset.
    async fn attribute_value(
        &self,
        user: &User,
        key: &AttributeKey,
    ) -> Result<Option<String>, LookupError>;
}

// =============================================================================
// Clock Trait (Infrastructure)
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
