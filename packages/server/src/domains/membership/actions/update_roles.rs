//! Update member roles action

use tracing::{error, info};

use super::notify::announce;
use crate::common::{Actor, MembershipError, MembershipId, RoleId, StoreError};
use crate::domains::membership::events::MembershipAction;
use crate::domains::membership::models::Membership;
use crate::domains::membership::service::MembershipContext;

/// Replace a membership's directly assigned roles.
///
/// The announcement names the roles as saved, not as requested.
pub async fn update_roles(
    ctx: &MembershipContext,
    actor: &Actor,
    membership_id: MembershipId,
    role_ids: Vec<RoleId>,
) -> Result<Membership, MembershipError> {
    let store = &ctx.deps.store;

    let mut membership = store
        .find_membership_by_id(membership_id)
        .await?
        .ok_or_else(|| MembershipError::not_found("Membership", membership_id))?;

    let roles = store.resolve_roles(&role_ids).await?;
    membership.assign_roles(roles);

    // Unknown role ids resolve to nothing
    if let Err(errors) = membership.validate() {
        error!(errors = %errors, membership_id = %membership_id, "Refusing to save membership");
        return Err(MembershipError::Persistence(StoreError::Validation(errors)));
    }

    let saved = store.save_membership(&membership).await.map_err(|e| {
        error!(error = %e, membership_id = %membership_id, "Failed to save membership");
        MembershipError::Persistence(e)
    })?;

    info!(
        membership_id = %saved.id,
        roles = ?saved.role_names(),
        actor = %actor.name(),
        actor_id = ?actor.user_id(),
        "Member roles updated"
    );

    let action = MembershipAction::UpdateMember {
        role_names: saved.role_names(),
    };
    announce(ctx, actor, &saved, action).await;

    Ok(saved)
}
