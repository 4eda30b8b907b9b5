//! Membership service
//!
//! Joining, leaving, moderation (ban/unban), join-request approval, role
//! changes, and notification preferences. Counter updates for leave, ban,
//! unban, and approval run as sequential repository calls; only invitation
//! acceptance and direct joins need the fully transactional unit.

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use grange_core::events::{
    JoinRequestApprovedEvent, JoinRequestRejectedEvent, JoinRequestedEvent, MemberBannedEvent,
    MemberJoinedEvent, MemberLeftEvent, MemberRoleChangedEvent, MemberUnbannedEvent,
};
use grange_core::{
    DomainError, DomainEvent, GroupMembership, GroupPrivacy, GroupRole, MembershipStatus,
    NotificationPrefs, UserDisplay,
};

use crate::dto::{BanMemberRequest, MembershipResponse, UpdateMemberRoleRequest, UpdateNotificationsRequest};

use super::authorizer::RoleAuthorizer;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Reject a join/redeem attempt that collides with an existing membership.
/// A `left` record is fine: it gets reactivated downstream.
pub(crate) fn gate_existing_membership(membership: &GroupMembership) -> ServiceResult<()> {
    match membership.status {
        MembershipStatus::Active => Err(ServiceError::Domain(DomainError::AlreadyMember)),
        MembershipStatus::Pending => Err(ServiceError::Domain(DomainError::JoinRequestPending)),
        MembershipStatus::Banned(_) => Err(ServiceError::Domain(DomainError::UserBanned)),
        MembershipStatus::Left => Ok(()),
    }
}

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Join a group without an invitation.
    ///
    /// Public groups admit immediately; private groups produce a pending
    /// request; invite-only groups reject direct joins. A previously-left
    /// member rejoins directly in all joinable cases.
    #[instrument(skip(self))]
    pub async fn join_group(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<MembershipResponse> {
        let group = self
            .ctx
            .groups()
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Group", group_id.to_string()))?;

        let existing = self.ctx.memberships().find(group_id, user_id).await?;
        if let Some(membership) = &existing {
            gate_existing_membership(membership)?;
        }
        let rejoining = existing.is_some();

        match group.privacy {
            GroupPrivacy::Public => {
                let membership = self
                    .ctx
                    .acceptance()
                    .join(group_id, user_id, Uuid::new_v4())
                    .await?;

                info!(group_id = %group_id, user_id = %user_id, "Member joined group");

                self.ctx
                    .publisher()
                    .publish(&DomainEvent::MemberJoined(MemberJoinedEvent::new(
                        group_id, user_id, None,
                    )))
                    .await;

                Ok(self.to_response(&membership).await)
            }
            GroupPrivacy::Private => {
                if rejoining {
                    // A former member of a private group rejoins without
                    // another approval round.
                    let membership = self
                        .ctx
                        .acceptance()
                        .join(group_id, user_id, Uuid::new_v4())
                        .await?;

                    info!(group_id = %group_id, user_id = %user_id, "Former member rejoined group");

                    self.ctx
                        .publisher()
                        .publish(&DomainEvent::MemberJoined(MemberJoinedEvent::new(
                            group_id, user_id, None,
                        )))
                        .await;

                    return Ok(self.to_response(&membership).await);
                }

                let request = GroupMembership::pending(Uuid::new_v4(), group_id, user_id);
                self.ctx.memberships().create(&request).await?;

                info!(group_id = %group_id, user_id = %user_id, "Join request created");

                self.ctx
                    .publisher()
                    .publish(&DomainEvent::JoinRequested(JoinRequestedEvent::new(
                        group_id, user_id,
                    )))
                    .await;

                Ok(self.to_response(&request).await)
            }
            GroupPrivacy::InviteOnly => {
                Err(ServiceError::Domain(DomainError::GroupNotJoinable))
            }
        }
    }

    /// Approve a pending join request (admin or above)
    #[instrument(skip(self))]
    pub async fn approve_request(
        &self,
        group_id: Uuid,
        target_id: Uuid,
        actor_id: Uuid,
    ) -> ServiceResult<MembershipResponse> {
        RoleAuthorizer::new(self.ctx)
            .require(group_id, actor_id, GroupRole::Admin)
            .await?;

        let membership = self
            .ctx
            .memberships()
            .find(group_id, target_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::MembershipNotFound))?;

        self.ctx.memberships().approve(membership.id).await?;
        self.ctx.groups().adjust_member_count(group_id, 1).await?;
        self.ctx.user_stats().adjust_joined_count(target_id, 1).await?;

        info!(group_id = %group_id, user_id = %target_id, actor_id = %actor_id, "Join request approved");

        self.ctx
            .publisher()
            .publish(&DomainEvent::JoinRequestApproved(JoinRequestApprovedEvent {
                group_id,
                user_id: target_id,
                approved_by: actor_id,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        let refreshed = self
            .ctx
            .memberships()
            .find_by_id(membership.id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::MembershipNotFound))?;

        Ok(self.to_response(&refreshed).await)
    }

    /// Reject a pending join request (admin or above); removes the record
    #[instrument(skip(self))]
    pub async fn reject_request(
        &self,
        group_id: Uuid,
        target_id: Uuid,
        actor_id: Uuid,
    ) -> ServiceResult<()> {
        RoleAuthorizer::new(self.ctx)
            .require(group_id, actor_id, GroupRole::Admin)
            .await?;

        let membership = self
            .ctx
            .memberships()
            .find(group_id, target_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::MembershipNotFound))?;

        if membership.status != MembershipStatus::Pending {
            return Err(ServiceError::Domain(DomainError::InvalidTransition {
                from: membership.status.as_str().to_string(),
                to: "rejected".to_string(),
            }));
        }

        self.ctx.memberships().delete_pending(membership.id).await?;

        info!(group_id = %group_id, user_id = %target_id, actor_id = %actor_id, "Join request rejected");

        self.ctx
            .publisher()
            .publish(&DomainEvent::JoinRequestRejected(JoinRequestRejectedEvent {
                group_id,
                user_id: target_id,
                rejected_by: actor_id,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        Ok(())
    }

    /// Leave a group. The owner must transfer ownership first.
    #[instrument(skip(self))]
    pub async fn leave_group(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let membership = self
            .ctx
            .memberships()
            .find(group_id, user_id)
            .await?
            .filter(GroupMembership::is_active)
            .ok_or(ServiceError::Domain(DomainError::NotAMember))?;

        if membership.role == GroupRole::Owner {
            return Err(ServiceError::Domain(DomainError::CannotLeaveOwnedGroup));
        }

        self.ctx.memberships().mark_left(membership.id).await?;
        self.ctx.groups().adjust_member_count(group_id, -1).await?;
        self.ctx.user_stats().adjust_joined_count(user_id, -1).await?;

        info!(group_id = %group_id, user_id = %user_id, "Member left group");

        self.ctx
            .publisher()
            .publish(&DomainEvent::MemberLeft(MemberLeftEvent {
                group_id,
                user_id,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        Ok(())
    }

    /// Ban an active member (admin or above, and the actor must outrank
    /// the target; the owner is unbannable)
    #[instrument(skip(self, request))]
    pub async fn ban_member(
        &self,
        group_id: Uuid,
        target_id: Uuid,
        actor_id: Uuid,
        request: BanMemberRequest,
    ) -> ServiceResult<()> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let actor = RoleAuthorizer::new(self.ctx)
            .require(group_id, actor_id, GroupRole::Admin)
            .await?;

        let target = self
            .ctx
            .memberships()
            .find(group_id, target_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::MembershipNotFound))?;

        if target.role == GroupRole::Owner {
            return Err(ServiceError::Domain(DomainError::CannotBanOwner));
        }
        if target.role.rank() >= actor.role.rank() {
            return Err(ServiceError::permission_denied("cannot ban this member"));
        }

        self.ctx
            .memberships()
            .ban(target.id, actor_id, &request.reason)
            .await?;
        self.ctx.groups().adjust_member_count(group_id, -1).await?;
        self.ctx.user_stats().adjust_joined_count(target_id, -1).await?;

        info!(group_id = %group_id, user_id = %target_id, actor_id = %actor_id, "Member banned");

        self.ctx
            .publisher()
            .publish(&DomainEvent::MemberBanned(MemberBannedEvent {
                group_id,
                user_id: target_id,
                banned_by: actor_id,
                reason: request.reason,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        Ok(())
    }

    /// Lift a ban; the membership returns to active
    #[instrument(skip(self))]
    pub async fn unban_member(
        &self,
        group_id: Uuid,
        target_id: Uuid,
        actor_id: Uuid,
    ) -> ServiceResult<()> {
        RoleAuthorizer::new(self.ctx)
            .require(group_id, actor_id, GroupRole::Admin)
            .await?;

        let target = self
            .ctx
            .memberships()
            .find(group_id, target_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::MembershipNotFound))?;

        self.ctx.memberships().unban(target.id).await?;
        self.ctx.groups().adjust_member_count(group_id, 1).await?;
        self.ctx.user_stats().adjust_joined_count(target_id, 1).await?;

        info!(group_id = %group_id, user_id = %target_id, actor_id = %actor_id, "Member unbanned");

        self.ctx
            .publisher()
            .publish(&DomainEvent::MemberUnbanned(MemberUnbannedEvent {
                group_id,
                user_id: target_id,
                unbanned_by: actor_id,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        Ok(())
    }

    /// Change a member's role.
    ///
    /// Admins move members between `member` and `moderator`; only the
    /// owner grants or revokes `admin`. The owner role is not assignable.
    #[instrument(skip(self, request))]
    pub async fn update_member_role(
        &self,
        group_id: Uuid,
        target_id: Uuid,
        actor_id: Uuid,
        request: UpdateMemberRoleRequest,
    ) -> ServiceResult<MembershipResponse> {
        let actor = RoleAuthorizer::new(self.ctx)
            .require(group_id, actor_id, GroupRole::Admin)
            .await?;

        if request.role == GroupRole::Owner {
            return Err(ServiceError::validation(
                "ownership is transferred, not assigned",
            ));
        }

        let mut target = self
            .ctx
            .memberships()
            .find(group_id, target_id)
            .await?
            .filter(GroupMembership::is_active)
            .ok_or(ServiceError::Domain(DomainError::MembershipNotFound))?;

        if target.role == GroupRole::Owner {
            return Err(ServiceError::permission_denied("cannot change the owner's role"));
        }
        if target.role.rank() >= actor.role.rank() || request.role.rank() >= actor.role.rank() {
            return Err(ServiceError::permission_denied("cannot assign this role"));
        }

        self.ctx
            .memberships()
            .update_role(target.id, request.role)
            .await?;
        target.role = request.role;

        info!(group_id = %group_id, user_id = %target_id, role = %request.role, "Member role changed");

        self.ctx
            .publisher()
            .publish(&DomainEvent::MemberRoleChanged(MemberRoleChangedEvent {
                group_id,
                user_id: target_id,
                changed_by: actor_id,
                role: request.role,
                timestamp: chrono::Utc::now(),
            }))
            .await;

        Ok(self.to_response(&target).await)
    }

    /// Update the caller's own notification preferences
    #[instrument(skip(self, request))]
    pub async fn update_notifications(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        request: UpdateNotificationsRequest,
    ) -> ServiceResult<MembershipResponse> {
        let mut membership = self
            .ctx
            .memberships()
            .find(group_id, user_id)
            .await?
            .filter(GroupMembership::is_active)
            .ok_or(ServiceError::Domain(DomainError::NotAMember))?;

        let prefs = NotificationPrefs {
            new_posts: request.new_posts.unwrap_or(membership.notifications.new_posts),
            events: request.events.unwrap_or(membership.notifications.events),
        };

        self.ctx
            .memberships()
            .update_notifications(membership.id, prefs)
            .await?;
        membership.notifications = prefs;

        Ok(self.to_response(&membership).await)
    }

    /// Record member activity in a group
    #[instrument(skip(self))]
    pub async fn record_activity(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        self.ctx
            .memberships()
            .touch_activity(group_id, user_id)
            .await
            .map_err(ServiceError::from)
    }

    /// Get a member of a group
    #[instrument(skip(self))]
    pub async fn get_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<MembershipResponse> {
        let membership = self
            .ctx
            .memberships()
            .find(group_id, user_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::MembershipNotFound))?;

        Ok(self.to_response(&membership).await)
    }

    /// List active members of a group (active members only may look)
    #[instrument(skip(self))]
    pub async fn list_members(
        &self,
        group_id: Uuid,
        caller_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> ServiceResult<Vec<MembershipResponse>> {
        let authorizer = RoleAuthorizer::new(self.ctx);
        if !authorizer.is_active_member(group_id, caller_id).await? {
            return Err(ServiceError::Domain(DomainError::NotAMember));
        }

        let members = self
            .ctx
            .memberships()
            .find_by_group(group_id, limit, after)
            .await?;

        let mut responses = Vec::with_capacity(members.len());
        for member in &members {
            responses.push(self.to_response(member).await);
        }

        Ok(responses)
    }

    /// List the staff (moderators and above) of a group (admin or above)
    #[instrument(skip(self))]
    pub async fn list_staff(
        &self,
        group_id: Uuid,
        caller_id: Uuid,
    ) -> ServiceResult<Vec<MembershipResponse>> {
        RoleAuthorizer::new(self.ctx)
            .require(group_id, caller_id, GroupRole::Admin)
            .await?;

        let staff = self.ctx.memberships().list_staff(group_id).await?;

        let mut responses = Vec::with_capacity(staff.len());
        for member in &staff {
            responses.push(self.to_response(member).await);
        }

        Ok(responses)
    }

    /// Resolve display info and build the response; directory failures are
    /// logged and degrade to a response without user info
    pub(crate) async fn to_response(&self, membership: &GroupMembership) -> MembershipResponse {
        let user = self.lookup_display(membership.user_id).await;
        MembershipResponse::from_membership(membership, user)
    }

    async fn lookup_display(&self, user_id: Uuid) -> Option<UserDisplay> {
        match self.ctx.user_directory().display(user_id).await {
            Ok(display) => display,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "User directory lookup failed");
                None
            }
        }
    }
}
