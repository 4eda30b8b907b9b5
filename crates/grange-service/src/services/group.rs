//! Group service
//!
//! Handles group creation (with unique slug assignment), resolution by id
//! or slug, updates, and soft deletion.

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use grange_core::events::{GroupCreatedEvent, GroupDeactivatedEvent, GroupUpdatedEvent};
use grange_core::{
    slugify, DomainError, DomainEvent, Group, GroupMembership, GroupRole,
};

use crate::dto::{CreateGroupRequest, GroupResponse, UpdateGroupRequest};

use super::authorizer::RoleAuthorizer;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Slug probes per generation pass
const SLUG_PROBE_LIMIT: u32 = 50;
/// Whole generate-then-insert cycles before giving up on a slug race
const SLUG_RETRY_LIMIT: u32 = 5;

/// Group service
pub struct GroupService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GroupService<'a> {
    /// Create a new GroupService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a group; the creator becomes its owner.
    ///
    /// The slug probe is advisory: two concurrent creations can pick the
    /// same candidate, so the insert re-verifies via the unique constraint
    /// and the whole generate-insert cycle retries on conflict.
    #[instrument(skip(self, request))]
    pub async fn create_group(
        &self,
        owner_id: Uuid,
        request: CreateGroupRequest,
    ) -> ServiceResult<GroupResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        for _ in 0..SLUG_RETRY_LIMIT {
            let slug = self.generate_unique_slug(&request.name).await?;

            let group_id = Uuid::new_v4();
            let mut group = Group::new(
                group_id,
                request.name.clone(),
                slug,
                request.privacy,
                owner_id,
            );
            group.description = request.description.clone();
            group.member_count = 1;

            let owner_membership =
                GroupMembership::new(Uuid::new_v4(), group_id, owner_id, GroupRole::Owner, None);

            match self.ctx.groups().create_with_owner(&group, &owner_membership).await {
                Ok(()) => {
                    info!(group_id = %group.id, slug = %group.slug, owner_id = %owner_id, "Group created");

                    self.ctx
                        .publisher()
                        .publish(&DomainEvent::GroupCreated(GroupCreatedEvent::new(
                            group.id, owner_id,
                        )))
                        .await;

                    return Ok(GroupResponse::from(group));
                }
                Err(DomainError::SlugConflict) => {}
                Err(e) => return Err(e.into()),
            }
        }

        warn!(name = %request.name, "Slug generation exhausted after retries");
        Err(ServiceError::Domain(DomainError::SlugConflict))
    }

    /// Resolve a group by opaque id or human-readable slug.
    ///
    /// Tries the identifier as an id first, then falls back to slug lookup.
    /// Soft-deleted groups resolve to not-found.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id_or_slug: &str) -> ServiceResult<Group> {
        if let Ok(id) = id_or_slug.parse::<Uuid>() {
            if let Some(group) = self.ctx.groups().find_by_id(id).await? {
                return Ok(group);
            }
        }

        self.ctx
            .groups()
            .find_by_slug(id_or_slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("Group", id_or_slug.to_string()))
    }

    /// Get a group by id or slug
    #[instrument(skip(self))]
    pub async fn get_group(&self, id_or_slug: &str) -> ServiceResult<GroupResponse> {
        let group = self.resolve(id_or_slug).await?;
        Ok(GroupResponse::from(group))
    }

    /// Update group settings (admin or above); renaming re-runs slug
    /// assignment with the same write-time re-check as creation
    #[instrument(skip(self, request))]
    pub async fn update_group(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
        request: UpdateGroupRequest,
    ) -> ServiceResult<GroupResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        RoleAuthorizer::new(self.ctx)
            .require(group_id, actor_id, GroupRole::Admin)
            .await?;

        let mut group = self
            .ctx
            .groups()
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Group", group_id.to_string()))?;

        if let Some(description) = request.description {
            group.set_description(Some(description));
        }
        if let Some(privacy) = request.privacy {
            group.set_privacy(privacy);
        }

        match request.name {
            Some(name) if name != group.name => {
                // Renaming re-assigns the slug; the insert-time unique check
                // still applies, so retry the cycle on a losing race.
                let mut updated = false;
                for _ in 0..SLUG_RETRY_LIMIT {
                    let slug = self.generate_unique_slug(&name).await?;
                    group.rename(name.clone(), slug);

                    match self.ctx.groups().update(&group).await {
                        Ok(()) => {
                            updated = true;
                            break;
                        }
                        Err(DomainError::SlugConflict) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                if !updated {
                    return Err(ServiceError::Domain(DomainError::SlugConflict));
                }
            }
            _ => {
                self.ctx.groups().update(&group).await?;
            }
        }

        info!(group_id = %group.id, actor_id = %actor_id, "Group updated");

        self.ctx
            .publisher()
            .publish(&DomainEvent::GroupUpdated(GroupUpdatedEvent {
                group_id: group.id,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        Ok(GroupResponse::from(group))
    }

    /// Soft-delete a group (owner only)
    #[instrument(skip(self))]
    pub async fn deactivate_group(&self, group_id: Uuid, actor_id: Uuid) -> ServiceResult<()> {
        RoleAuthorizer::new(self.ctx)
            .require(group_id, actor_id, GroupRole::Owner)
            .await?;

        self.ctx.groups().deactivate(group_id).await?;

        info!(group_id = %group_id, actor_id = %actor_id, "Group deactivated");

        self.ctx
            .publisher()
            .publish(&DomainEvent::GroupDeactivated(GroupDeactivatedEvent {
                group_id,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        Ok(())
    }

    /// List the groups a user is an active member of
    #[instrument(skip(self))]
    pub async fn list_user_groups(&self, user_id: Uuid) -> ServiceResult<Vec<GroupResponse>> {
        let groups = self.ctx.groups().find_by_user(user_id).await?;
        Ok(groups.iter().map(GroupResponse::from).collect())
    }

    /// Derive a slug from a name and probe numeric suffixes until a free
    /// candidate is found
    async fn generate_unique_slug(&self, name: &str) -> ServiceResult<String> {
        let base = {
            let s = slugify(name);
            if s.is_empty() {
                "group".to_string()
            } else {
                s
            }
        };

        if !self.ctx.groups().slug_exists(&base).await? {
            return Ok(base);
        }

        for n in 1..=SLUG_PROBE_LIMIT {
            let candidate = format!("{base}-{n}");
            if !self.ctx.groups().slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(ServiceError::Domain(DomainError::SlugConflict))
    }
}
