//! Entry point for membership mutations.

use std::sync::Arc;
use tracing::{info, warn};

use super::actions;
use super::formatter::EventFormatter;
use super::models::Membership;
use super::publisher::NotificationPublisher;
use crate::common::{Actor, MembershipError, MembershipId, ProjectId, RoleId, UserId};
use crate::config::NotificationSettings;
use crate::kernel::{AttributeKey, ServerDeps};

/// Everything an action needs, built once per service.
pub struct MembershipContext {
    pub deps: ServerDeps,
    pub formatter: EventFormatter,
    pub publisher: NotificationPublisher,
    /// `None` when the phone attribute definition could not be resolved.
    pub phone_attribute: Option<AttributeKey>,
}

/// Adds, updates and removes project members, announcing each change.
///
/// Cheap to clone and safe to share between tasks.
#[derive(Clone)]
pub struct MembershipService {
    ctx: Arc<MembershipContext>,
}

impl MembershipService {
    /// Build the service, resolving the phone attribute definition once.
    pub async fn new(deps: ServerDeps, settings: &NotificationSettings) -> Self {
        let phone_attribute = match deps
            .directory
            .resolve_attribute(&settings.phone_attribute)
            .await
        {
            Ok(key) => {
                info!(attribute = %key.name, attribute_id = key.id, "Phone attribute resolved");
                Some(key)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    attribute = %settings.phone_attribute,
                    "Phone attribute unavailable, notifications will carry no phone number"
                );
                None
            }
        };

        let publisher = NotificationPublisher::new(
            deps.nats.clone(),
            settings.subject.clone(),
            settings.publish_timeout,
        );

        Self {
            ctx: Arc::new(MembershipContext {
                deps,
                formatter: EventFormatter::new(settings.locale, settings.utc_offset),
                publisher,
                phone_attribute,
            }),
        }
    }

    pub fn publisher(&self) -> &NotificationPublisher {
        &self.ctx.publisher
    }

    pub async fn add_members(
        &self,
        actor: &Actor,
        project_id: ProjectId,
        user_ids: Vec<Option<UserId>>,
        role_ids: Vec<RoleId>,
    ) -> Result<Vec<Membership>, MembershipError> {
        actions::add_members(&self.ctx, actor, project_id, user_ids, role_ids).await
    }

    pub async fn update_roles(
        &self,
        actor: &Actor,
        membership_id: MembershipId,
        role_ids: Vec<RoleId>,
    ) -> Result<Membership, MembershipError> {
        actions::update_roles(&self.ctx, actor, membership_id, role_ids).await
    }

    /// Returns whether the membership was deleted.
    pub async fn remove(
        &self,
        actor: &Actor,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> Result<bool, MembershipError> {
        actions::remove_member(&self.ctx, actor, project_id, membership_id).await
    }
}
