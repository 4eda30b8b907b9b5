//! Role authorizer
//!
//! Thin guard used by every mutating operation: resolves the caller's
//! active membership and checks its role rank against the operation's
//! minimum. Returns the membership on success so callers avoid a second
//! lookup.

use tracing::instrument;
use uuid::Uuid;

use grange_core::{DomainError, GroupMembership, GroupRole};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Role-based access guard
pub struct RoleAuthorizer<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoleAuthorizer<'a> {
    /// Create a new RoleAuthorizer
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Require an active membership with at least `min_role`.
    ///
    /// A missing or non-active membership is indistinguishable to the
    /// caller: both are "not a member".
    #[instrument(skip(self))]
    pub async fn require(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        min_role: GroupRole,
    ) -> ServiceResult<GroupMembership> {
        let membership = self
            .ctx
            .memberships()
            .find(group_id, user_id)
            .await?
            .filter(GroupMembership::is_active)
            .ok_or(ServiceError::Domain(DomainError::NotAMember))?;

        if !membership.role.at_least(min_role) {
            return Err(ServiceError::Domain(DomainError::InsufficientRole {
                required: min_role,
            }));
        }

        Ok(membership)
    }

    /// Whether the user holds an active membership (used by content
    /// authorization callers)
    #[instrument(skip(self))]
    pub async fn is_active_member(&self, group_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        self.ctx
            .memberships()
            .is_active_member(group_id, user_id)
            .await
            .map_err(ServiceError::from)
    }
}
