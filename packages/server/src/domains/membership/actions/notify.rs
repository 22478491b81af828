//! Fact assembly and publishing shared by every action.

use tracing::{debug, warn};

use crate::common::{Actor, LookupError};
use crate::domains::membership::events::{MembershipAction, MembershipChangeFact};
use crate::domains::membership::models::{Membership, User};
use crate::domains::membership::service::MembershipContext;

/// Build the fact for `membership` and publish it.
///
/// Placeholder memberships have no member to name and are skipped. Delivery
/// outcomes are logged and counted by the publisher, never returned.
pub(super) async fn announce(
    ctx: &MembershipContext,
    actor: &Actor,
    membership: &Membership,
    action: MembershipAction,
) {
    let Some(user) = membership.user.as_ref() else {
        debug!(
            membership_id = %membership.id,
            "Skipping notification for placeholder membership"
        );
        return;
    };

    let member_phone = resolve_phone(ctx, user).await;

    let fact = MembershipChangeFact::builder()
        .project_id(membership.project.id)
        .project_name(membership.project.name.as_str())
        .member_name(user.name.as_str())
        .member_phone(member_phone)
        .actor_name(actor.name())
        .action(action)
        .occurred_at(ctx.deps.clock.now())
        .build();

    let payload = ctx.formatter.format(&fact);
    ctx.publisher.publish(&payload).await;
}

/// The member's phone number, or `None` when it cannot be found.
async fn resolve_phone(ctx: &MembershipContext, user: &User) -> Option<String> {
    let Some(key) = ctx.phone_attribute.as_ref() else {
        debug!(user_id = %user.id, "Phone attribute not configured, sending without phone");
        return None;
    };

    let lookup = match ctx.deps.directory.attribute_value(user, key).await {
        Ok(Some(phone)) => return Some(phone),
        Ok(None) => LookupError::ValueAbsent(key.name.clone()),
        Err(e) => e,
    };

    warn!(
        error = %lookup,
        user_id = %user.id,
        "Phone lookup failed, sending without phone"
    );
    None
}
