//! Add members action

use std::collections::HashSet;
use tracing::{error, info};

use super::notify::announce;
use crate::common::{Actor, MembershipError, ProjectId, RoleId, StoreError, UserId, ValidationErrors};
use crate::domains::membership::events::MembershipAction;
use crate::domains::membership::models::{Membership, NewMembership};
use crate::domains::membership::service::MembershipContext;

/// Add users to a project with the given roles.
///
/// An empty `user_ids` still creates one placeholder membership. Every real
/// member created is announced; placeholders are not.
pub async fn add_members(
    ctx: &MembershipContext,
    actor: &Actor,
    project_id: ProjectId,
    user_ids: Vec<Option<UserId>>,
    role_ids: Vec<RoleId>,
) -> Result<Vec<Membership>, MembershipError> {
    let user_ids = if user_ids.is_empty() {
        vec![None]
    } else {
        user_ids
    };

    // Only roles the store can assign count; unknown ids are dropped here so
    // validation sees what would actually be saved
    let role_ids: Vec<RoleId> = ctx
        .deps
        .store
        .resolve_roles(&role_ids)
        .await?
        .into_iter()
        .map(|role| role.id)
        .collect();

    let specs: Vec<NewMembership> = user_ids
        .into_iter()
        .map(|user_id| NewMembership::new(user_id, role_ids.clone()))
        .collect();

    validate(&specs).map_err(MembershipError::Validation)?;

    info!(
        project_id = %project_id,
        count = specs.len(),
        actor = %actor.name(),
        actor_id = ?actor.user_id(),
        "Adding members"
    );

    let created = ctx
        .deps
        .store
        .create_memberships(project_id, specs)
        .await
        .map_err(|e| match e {
            StoreError::Validation(errors) => MembershipError::Validation(errors),
            other => {
                error!(error = %other, project_id = %project_id, "Failed to create memberships");
                MembershipError::Persistence(other)
            }
        })?;

    for membership in announced(&created) {
        announce(ctx, actor, membership, MembershipAction::AddMember).await;
    }

    Ok(created)
}

/// Memberships to announce after a batch add.
///
/// A batch of one announces its last element; larger batches announce each
/// element individually. Neither case aggregates.
fn announced(created: &[Membership]) -> &[Membership] {
    match created.len() {
        1 => &created[created.len() - 1..],
        _ => created,
    }
}

fn validate(specs: &[NewMembership]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut seen = HashSet::new();

    for spec in specs {
        spec.validate(&mut errors);
        if let Some(user_id) = spec.user_id {
            if !seen.insert(user_id) {
                errors.add("user_id", "has already been taken");
            }
        }
    }

    errors.into_result()
}
