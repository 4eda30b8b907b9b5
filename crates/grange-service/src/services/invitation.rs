//! Invitation service
//!
//! Issues direct and shareable-code invitations, validates and revokes
//! them, and coordinates redemption through the atomic acceptance unit.

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use grange_core::events::{InviteIssuedEvent, InviteRevokedEvent, MemberJoinedEvent};
use grange_core::traits::AcceptInvitation;
use grange_core::{DomainError, DomainEvent, GroupInvitation, GroupRole, InviteCode};

use crate::dto::{CreateCodeInviteRequest, CreateDirectInviteRequest, InvitationResponse, MembershipResponse};

use super::authorizer::RoleAuthorizer;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::membership::{gate_existing_membership, MembershipService};

/// Generation attempts before giving up on a colliding code
const CODE_GENERATION_ATTEMPTS: u32 = 10;

/// Invitation service
pub struct InvitationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InvitationService<'a> {
    /// Create a new InvitationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a direct invitation to a specific user (admin or above)
    #[instrument(skip(self, request))]
    pub async fn create_direct_invite(
        &self,
        group_id: Uuid,
        issuer_id: Uuid,
        request: CreateDirectInviteRequest,
    ) -> ServiceResult<InvitationResponse> {
        // Rejected before any lookup or write
        if request.user_id == issuer_id {
            return Err(ServiceError::Domain(DomainError::CannotInviteSelf));
        }

        let group = self
            .ctx
            .groups()
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Group", group_id.to_string()))?;

        RoleAuthorizer::new(self.ctx)
            .require(group.id, issuer_id, GroupRole::Admin)
            .await?;

        if let Some(existing) = self.ctx.memberships().find(group_id, request.user_id).await? {
            gate_existing_membership(&existing)?;
        }

        if self
            .ctx
            .invitations()
            .find_pending_direct(group_id, request.user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Domain(DomainError::DuplicateInvite));
        }

        let expires_at = Utc::now() + Duration::days(self.ctx.invite_config().default_ttl_days);

        let invitation = self
            .persist_with_fresh_code(|code| {
                GroupInvitation::direct(
                    Uuid::new_v4(),
                    code,
                    group_id,
                    issuer_id,
                    request.user_id,
                    expires_at,
                )
            })
            .await?;

        info!(
            code = %invitation.code,
            group_id = %group_id,
            issuer_id = %issuer_id,
            invited_user = %request.user_id,
            "Direct invitation issued"
        );

        self.publish_issued(&invitation).await;

        Ok(InvitationResponse::from(&invitation))
    }

    /// Issue a shareable code invitation (admin or above)
    #[instrument(skip(self, request))]
    pub async fn create_code_invite(
        &self,
        group_id: Uuid,
        issuer_id: Uuid,
        request: CreateCodeInviteRequest,
    ) -> ServiceResult<InvitationResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let group = self
            .ctx
            .groups()
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Group", group_id.to_string()))?;

        RoleAuthorizer::new(self.ctx)
            .require(group.id, issuer_id, GroupRole::Admin)
            .await?;

        let max_uses = request.max_uses.unwrap_or(1);
        let limit = self.ctx.invite_config().max_uses_limit;
        if max_uses < 1 || max_uses > limit {
            return Err(ServiceError::Domain(DomainError::InvalidMaxUses {
                min: 1,
                max: limit,
            }));
        }

        let now = Utc::now();
        let expires_at = match request.expires_at {
            Some(expires_at) if expires_at <= now => {
                return Err(ServiceError::Domain(DomainError::ExpiryNotInFuture));
            }
            Some(expires_at) => expires_at,
            None => now + Duration::days(self.ctx.invite_config().default_ttl_days),
        };

        let invitation = self
            .persist_with_fresh_code(|code| {
                GroupInvitation::shareable(
                    Uuid::new_v4(),
                    code,
                    group_id,
                    issuer_id,
                    max_uses,
                    expires_at,
                )
            })
            .await?;

        info!(
            code = %invitation.code,
            group_id = %group_id,
            issuer_id = %issuer_id,
            max_uses = max_uses,
            "Code invitation issued"
        );

        self.publish_issued(&invitation).await;

        Ok(InvitationResponse::from(&invitation))
    }

    /// Look up an invitation by code, surfacing why it cannot be redeemed
    #[instrument(skip(self))]
    pub async fn get_invite(&self, code: &str) -> ServiceResult<InvitationResponse> {
        let invitation = self.find_by_code(code).await?;
        invitation.validate(Utc::now())?;
        Ok(InvitationResponse::from(&invitation))
    }

    /// List all invitations of a group, including consumed and expired
    /// ones (admin or above; the records double as an audit trail)
    #[instrument(skip(self))]
    pub async fn list_group_invites(
        &self,
        group_id: Uuid,
        caller_id: Uuid,
    ) -> ServiceResult<Vec<InvitationResponse>> {
        RoleAuthorizer::new(self.ctx)
            .require(group_id, caller_id, GroupRole::Admin)
            .await?;

        let invitations = self.ctx.invitations().find_by_group(group_id).await?;
        Ok(invitations.iter().map(InvitationResponse::from).collect())
    }

    /// Revoke a pending invitation (its issuer, or an admin).
    ///
    /// Revocation reuses the expired terminal state.
    #[instrument(skip(self))]
    pub async fn revoke_invite(&self, code: &str, actor_id: Uuid) -> ServiceResult<()> {
        let invitation = self.find_by_code(code).await?;

        if invitation.invited_by != actor_id {
            RoleAuthorizer::new(self.ctx)
                .require(invitation.group_id, actor_id, GroupRole::Admin)
                .await?;
        }

        self.ctx.invitations().expire(invitation.id).await?;

        info!(code = %invitation.code, actor_id = %actor_id, "Invitation revoked");

        self.ctx
            .publisher()
            .publish(&DomainEvent::InviteRevoked(InviteRevokedEvent {
                group_id: invitation.group_id,
                code: invitation.code.as_str().to_string(),
                revoked_by: actor_id,
                timestamp: Utc::now(),
            }))
            .await;

        Ok(())
    }

    /// Redeem an invitation code and join the group.
    ///
    /// Validation happens up front for precise error reporting, then the
    /// membership write, both counters, and the invitation consumption
    /// commit as one unit. Every precondition is re-checked inside that
    /// unit, so a racing redeemer fails cleanly rather than half-applying.
    #[instrument(skip(self))]
    pub async fn accept_invite(
        &self,
        code: &str,
        user_id: Uuid,
    ) -> ServiceResult<MembershipResponse> {
        let invitation = self.find_by_code(code).await?;

        invitation.validate(Utc::now())?;

        if let Some(invited_user) = invitation.invited_user {
            if invited_user != user_id {
                return Err(ServiceError::Domain(DomainError::InviteNotAddressed));
            }
        }

        let group = self
            .ctx
            .groups()
            .find_by_id(invitation.group_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Domain(DomainError::group_not_found(invitation.group_id))
            })?;

        if let Some(existing) = self.ctx.memberships().find(group.id, user_id).await? {
            gate_existing_membership(&existing)?;
        }

        let membership = self
            .ctx
            .acceptance()
            .accept(AcceptInvitation {
                invitation_id: invitation.id,
                group_id: group.id,
                user_id,
                membership_id: Uuid::new_v4(),
                role: GroupRole::Member,
                invited_by: invitation.invited_by,
            })
            .await?;

        info!(
            code = %invitation.code,
            group_id = %group.id,
            user_id = %user_id,
            "Invitation accepted"
        );

        self.ctx
            .publisher()
            .publish(&DomainEvent::MemberJoined(MemberJoinedEvent::new(
                group.id,
                user_id,
                Some(invitation.invited_by),
            )))
            .await;

        Ok(MembershipService::new(self.ctx).to_response(&membership).await)
    }

    /// Parse and look up a code; malformed input is a validation error,
    /// an unknown code is not-found
    async fn find_by_code(&self, code: &str) -> ServiceResult<GroupInvitation> {
        let code = InviteCode::parse(code)
            .map_err(|e| ServiceError::Domain(DomainError::ValidationError(e.to_string())))?;

        self.ctx
            .invitations()
            .find_by_code(&code)
            .await?
            .ok_or_else(|| {
                ServiceError::Domain(DomainError::InvitationNotFound(code.as_str().to_string()))
            })
    }

    /// Insert an invitation, regenerating the code on collision.
    ///
    /// The database's unique constraint is the arbiter; the loop just
    /// retries with a fresh draw until it wins or the bound is hit.
    async fn persist_with_fresh_code<F>(&self, build: F) -> ServiceResult<GroupInvitation>
    where
        F: Fn(InviteCode) -> GroupInvitation,
    {
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            let invitation = build(InviteCode::generate());
            match self.ctx.invitations().create(&invitation).await {
                Ok(()) => return Ok(invitation),
                Err(DomainError::InviteCodeExists) => {}
                Err(e) => return Err(e.into()),
            }
        }

        warn!("Invite code generation exhausted after {CODE_GENERATION_ATTEMPTS} attempts");
        Err(ServiceError::Domain(DomainError::CodeGenerationExhausted))
    }

    async fn publish_issued(&self, invitation: &GroupInvitation) {
        self.ctx
            .publisher()
            .publish(&DomainEvent::InviteIssued(InviteIssuedEvent {
                group_id: invitation.group_id,
                code: invitation.code.as_str().to_string(),
                invited_by: invitation.invited_by,
                invited_user: invitation.invited_user,
                timestamp: Utc::now(),
            }))
            .await;
    }
}
