//! Remove member action

use tracing::info;

use super::notify::announce;
use crate::common::{Actor, MembershipError, MembershipId, ProjectId};
use crate::domains::membership::events::MembershipAction;
use crate::domains::membership::service::MembershipContext;

/// Remove a membership from a project.
///
/// The removal is announced before deletability is checked, so a membership
/// holding inherited roles is announced as deleted yet stays in place.
/// Returns whether the membership was actually deleted.
pub async fn remove_member(
    ctx: &MembershipContext,
    actor: &Actor,
    project_id: ProjectId,
    membership_id: MembershipId,
) -> Result<bool, MembershipError> {
    let store = &ctx.deps.store;

    let membership = store
        .find_membership(project_id, membership_id)
        .await?
        .ok_or_else(|| MembershipError::not_found("Membership", membership_id))?;

    announce(ctx, actor, &membership, MembershipAction::DeleteMember).await;

    if !membership.is_deletable() {
        info!(
            membership_id = %membership_id,
            project_id = %project_id,
            "Membership holds inherited roles, not deleting"
        );
        return Ok(false);
    }

    store.delete_membership(&membership).await?;
    info!(
        membership_id = %membership_id,
        project_id = %project_id,
        actor = %actor.name(),
        "Membership deleted"
    );

    Ok(true)
}
