// TestDependencies - mock implementations for testing
//
// Provides in-memory stand-ins for the membership store, user directory and
// clock that can be injected into ServerDeps for tests and the probe binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{
    AttributeKey, BaseClock, BaseMembershipStore, BaseUserDirectory, NatsPublisher, ServerDeps,
    TestNats,
};
use crate::common::{
    LookupError, MembershipId, ProjectId, RoleId, StoreError, UserId, ValidationErrors,
};
use crate::domains::membership::models::{
    MemberRole, Membership, NewMembership, Project, Role, User,
};

// =============================================================================
// In-memory Membership Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    projects: HashMap<ProjectId, Project>,
    users: HashMap<UserId, User>,
    roles: Vec<Role>,
    memberships: Vec<Membership>,
    next_id: i64,
    fail_saves: bool,
    /// Operation log, e.g. "create", "save", "delete"
    calls: Vec<String>,
}

/// Membership store backed by vectors behind a mutex.
///
/// Enforces one membership per user per project, like the real store's
/// uniqueness constraint.
#[derive(Default)]
pub struct InMemoryMembershipStore {
    state: Mutex<StoreState>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, id: i64, name: &str) -> Self {
        self.lock().projects.insert(
            ProjectId::new(id),
            Project {
                id: ProjectId::new(id),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_user(self, id: i64, name: &str) -> Self {
        self.lock().users.insert(
            UserId::new(id),
            User {
                id: UserId::new(id),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_role(self, id: i64, name: &str) -> Self {
        self.lock().roles.push(Role {
            id: RoleId::new(id),
            name: name.to_string(),
        });
        self
    }

    /// Seed an existing membership and return its id.
    pub fn seed_membership(&self, project_id: i64, user_id: i64, roles: Vec<MemberRole>) -> MembershipId {
        let mut state = self.lock();
        let id = state.allocate_id();
        let project = state
            .projects
            .get(&ProjectId::new(project_id))
            .cloned()
            .unwrap_or_else(|| Project {
                id: ProjectId::new(project_id),
                name: format!("project-{}", project_id),
            });
        let user = state.users.get(&UserId::new(user_id)).cloned();
        state.memberships.push(Membership {
            id,
            project,
            user,
            roles,
        });
        id
    }

    /// Make every `save_membership` fail with a validation error.
    pub fn fail_saves(&self) {
        self.lock().fail_saves = true;
    }

    pub fn role(&self, id: i64) -> Option<Role> {
        self.lock()
            .roles
            .iter()
            .find(|r| r.id == RoleId::new(id))
            .cloned()
    }

    pub fn membership(&self, id: MembershipId) -> Option<Membership> {
        self.lock().memberships.iter().find(|m| m.id == id).cloned()
    }

    pub fn memberships_for(&self, project_id: i64) -> Vec<Membership> {
        self.lock()
            .memberships
            .iter()
            .filter(|m| m.project.id == ProjectId::new(project_id))
            .cloned()
            .collect()
    }

    /// Operations performed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StoreState {
    fn allocate_id(&mut self) -> MembershipId {
        self.next_id += 1;
        MembershipId::new(self.next_id)
    }

    fn resolve(&self, role_ids: &[RoleId]) -> Vec<Role> {
        role_ids
            .iter()
            .filter_map(|id| self.roles.iter().find(|r| r.id == *id).cloned())
            .collect()
    }
}

#[async_trait]
impl BaseMembershipStore for InMemoryMembershipStore {
    async fn find_membership(
        &self,
        project_id: ProjectId,
        id: MembershipId,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(self
            .lock()
            .memberships
            .iter()
            .find(|m| m.id == id && m.project.id == project_id)
            .cloned())
    }

    async fn find_membership_by_id(
        &self,
        id: MembershipId,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(self.membership(id))
    }

    async fn create_memberships(
        &self,
        project_id: ProjectId,
        specs: Vec<NewMembership>,
    ) -> Result<Vec<Membership>, StoreError> {
        let mut state = self.lock();
        state.calls.push("create".to_string());

        let project = state
            .projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("project {} does not exist", project_id))?;

        let mut errors = ValidationErrors::new();
        for spec in &specs {
            let Some(user_id) = spec.user_id else {
                continue;
            };
            if !state.users.contains_key(&user_id) {
                errors.add("user_id", "is invalid");
            }
            let taken = state
                .memberships
                .iter()
                .any(|m| m.project.id == project_id && m.user.as_ref().map(|u| u.id) == Some(user_id));
            if taken {
                errors.add("user_id", "has already been taken");
            }
        }
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let mut created = Vec::with_capacity(specs.len());
        for spec in specs {
            let roles = state
                .resolve(&spec.role_ids)
                .into_iter()
                .map(MemberRole::direct)
                .collect();
            let membership = Membership {
                id: state.allocate_id(),
                project: project.clone(),
                user: spec.user_id.and_then(|id| state.users.get(&id).cloned()),
                roles,
            };
            state.memberships.push(membership.clone());
            created.push(membership);
        }

        Ok(created)
    }

    async fn save_membership(&self, membership: &Membership) -> Result<Membership, StoreError> {
        let mut state = self.lock();
        state.calls.push("save".to_string());

        if state.fail_saves {
            let mut errors = ValidationErrors::new();
            errors.add("role", "can't be empty");
            return Err(StoreError::Validation(errors));
        }

        let stored = state
            .memberships
            .iter_mut()
            .find(|m| m.id == membership.id)
            .ok_or_else(|| anyhow::anyhow!("membership {} vanished", membership.id))?;
        *stored = membership.clone();
        Ok(stored.clone())
    }

    async fn delete_membership(&self, membership: &Membership) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push("delete".to_string());
        state.memberships.retain(|m| m.id != membership.id);
        Ok(())
    }

    async fn resolve_roles(&self, role_ids: &[RoleId]) -> Result<Vec<Role>, StoreError> {
        Ok(self.lock().resolve(role_ids))
    }
}

// =============================================================================
// Mock User Directory
// =============================================================================

/// User directory with a fixed set of attribute definitions and values.
#[derive(Default)]
pub struct MockUserDirectory {
    definitions: Vec<AttributeKey>,
    values: HashMap<(UserId, i64), String>,
    fail_values: bool,
    resolve_calls: Mutex<usize>,
    value_calls: Mutex<usize>,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define an attribute such as "Phone Number".
    pub fn with_attribute(mut self, id: i64, name: &str) -> Self {
        self.definitions.push(AttributeKey {
            id,
            name: name.to_string(),
        });
        self
    }

    /// Set a user's value for a defined attribute.
    pub fn with_value(mut self, user_id: i64, attribute_id: i64, value: &str) -> Self {
        self.values
            .insert((UserId::new(user_id), attribute_id), value.to_string());
        self
    }

    /// Make every value lookup fail as if the directory were down.
    pub fn failing_values(mut self) -> Self {
        self.fail_values = true;
        self
    }

    pub fn resolve_calls(&self) -> usize {
        *self.resolve_calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn value_calls(&self) -> usize {
        *self.value_calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl BaseUserDirectory for MockUserDirectory {
    async fn resolve_attribute(&self, name: &str) -> Result<AttributeKey, LookupError> {
        *self.resolve_calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        self.definitions
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| LookupError::DefinitionMissing(name.to_string()))
    }

    async fn attribute_value(
        &self,
        user: &User,
        key: &AttributeKey,
    ) -> Result<Option<String>, LookupError> {
        *self.value_calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        if self.fail_values {
            return Err(LookupError::Directory(anyhow::anyhow!("directory unavailable")));
        }
        Ok(self.values.get(&(user.id, key.id)).cloned())
    }
}

// =============================================================================
// Fixed Clock
// =============================================================================

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl BaseClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub store: Arc<InMemoryMembershipStore>,
    pub directory: Arc<MockUserDirectory>,
    pub nats: Arc<dyn NatsPublisher>,
    pub clock: Arc<dyn BaseClock>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryMembershipStore::new()),
            directory: Arc::new(MockUserDirectory::new()),
            nats: Arc::new(TestNats::new()),
            clock: Arc::new(super::SystemClock),
        }
    }

    /// Set the membership store
    pub fn mock_store(mut self, store: InMemoryMembershipStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Set the user directory
    pub fn mock_directory(mut self, directory: MockUserDirectory) -> Self {
        self.directory = Arc::new(directory);
        self
    }

    /// Set the NATS publisher (TestNats, FailingNats, StalledNats)
    pub fn mock_nats(mut self, nats: Arc<dyn NatsPublisher>) -> Self {
        self.nats = nats;
        self
    }

    /// Pin the clock
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Arc::new(FixedClock(now));
        self
    }

    /// Convert into ServerDeps
    pub fn into_deps(self) -> ServerDeps {
        ServerDeps::new(self.store, self.directory, self.nats).with_clock(self.clock)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
