//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every invariant that must hold under
//! concurrent writers (membership uniqueness, invitation use budgets,
//! counter clamping, status-guarded transitions) is part of these
//! contracts, not of read-then-write logic in callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Group, GroupInvitation, GroupMembership, NotificationPrefs};
use crate::error::DomainError;
use crate::events::DomainEvent;
use crate::value_objects::{GroupRole, InviteCode};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Group Repository
// ============================================================================

#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Find an active group by ID (soft-deleted groups are invisible)
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Group>>;

    /// Find an active group by slug
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Group>>;

    /// List active groups a user holds an active membership in
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Group>>;

    /// Check whether a slug is taken (including by soft-deleted groups)
    async fn slug_exists(&self, slug: &str) -> RepoResult<bool>;

    /// Create a group together with its owner membership, atomically.
    ///
    /// Inserts the group (member_count starts at 1), the owner's active
    /// membership, and bumps the owner's joined-groups counter in one
    /// transaction. A slug unique violation maps to `SlugConflict` so the
    /// caller can regenerate and retry.
    async fn create_with_owner(
        &self,
        group: &Group,
        owner_membership: &GroupMembership,
    ) -> RepoResult<()>;

    /// Update name, slug, description, and privacy.
    ///
    /// A slug unique violation maps to `SlugConflict`.
    async fn update(&self, group: &Group) -> RepoResult<()>;

    /// Soft delete a group
    async fn deactivate(&self, id: Uuid) -> RepoResult<()>;

    /// Atomically adjust the denormalized member counter, clamped at zero
    async fn adjust_member_count(&self, group_id: Uuid, delta: i32) -> RepoResult<()>;
}

// ============================================================================
// Membership Repository
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find the membership record for a `(group, user)` pair
    async fn find(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<Option<GroupMembership>>;

    /// Find a membership by its ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<GroupMembership>>;

    /// Check whether a user holds an active membership
    async fn is_active_member(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    /// List memberships of a group, paginated by user id cursor
    async fn find_by_group(
        &self,
        group_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> RepoResult<Vec<GroupMembership>>;

    /// List a user's memberships across groups
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<GroupMembership>>;

    /// Active memberships with moderator role or above
    async fn list_staff(&self, group_id: Uuid) -> RepoResult<Vec<GroupMembership>>;

    /// Insert a new membership record.
    ///
    /// The `(group_id, user_id)` unique constraint is the authority; a
    /// violation maps to `AlreadyMember`.
    async fn create(&self, membership: &GroupMembership) -> RepoResult<()>;

    /// Reactivate a `left` membership: conditional update gated on the
    /// current status, refreshing `joined_at` and overwriting `invited_by`.
    /// Zero rows affected maps to `InvalidTransition`.
    async fn reactivate(&self, id: Uuid, invited_by: Option<Uuid>) -> RepoResult<GroupMembership>;

    /// Transition `active -> banned`, recording actor and reason.
    /// Guarded on the current status in the database.
    async fn ban(&self, id: Uuid, banned_by: Uuid, reason: &str) -> RepoResult<()>;

    /// Transition `banned -> active`, clearing ban metadata
    async fn unban(&self, id: Uuid) -> RepoResult<()>;

    /// Transition `active -> left`
    async fn mark_left(&self, id: Uuid) -> RepoResult<()>;

    /// Transition `pending -> active`
    async fn approve(&self, id: Uuid) -> RepoResult<()>;

    /// Remove a pending join request (the engine's only hard delete)
    async fn delete_pending(&self, id: Uuid) -> RepoResult<()>;

    /// Change a member's role
    async fn update_role(&self, id: Uuid, role: GroupRole) -> RepoResult<()>;

    /// Update per-member notification toggles
    async fn update_notifications(&self, id: Uuid, prefs: NotificationPrefs) -> RepoResult<()>;

    /// Refresh the member's last activity timestamp
    async fn touch_activity(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Invitation Repository
// ============================================================================

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Find an invitation by code
    async fn find_by_code(&self, code: &InviteCode) -> RepoResult<Option<GroupInvitation>>;

    /// List a group's invitations, newest first
    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<GroupInvitation>>;

    /// Find a pending direct invitation addressed to a user
    async fn find_pending_direct(
        &self,
        group_id: Uuid,
        invited_user: Uuid,
    ) -> RepoResult<Option<GroupInvitation>>;

    /// Insert an invitation.
    ///
    /// A code unique violation maps to `InviteCodeExists`; the issuer
    /// regenerates and retries.
    async fn create(&self, invitation: &GroupInvitation) -> RepoResult<()>;

    /// Move a pending invitation to the expired terminal state
    /// (administrative revocation). Zero rows maps to `InviteNotPending`.
    async fn expire(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Acceptance Unit
// ============================================================================

/// Command for the atomic acceptance write
#[derive(Debug, Clone)]
pub struct AcceptInvitation {
    pub invitation_id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub membership_id: Uuid,
    pub role: GroupRole,
    pub invited_by: Uuid,
}

/// The one multi-entity transaction in the engine.
///
/// Redeeming an invitation performs four writes that must commit together
/// or not at all: create-or-reactivate the membership, increment the group
/// member counter, increment the redeemer's joined-groups counter, and
/// consume the invitation. Implementations must guard the invitation
/// consumption on `used_count < max_uses` so concurrent redeemers cannot
/// overshoot the budget, and must treat a membership uniqueness conflict as
/// `AlreadyMember`.
#[async_trait]
pub trait AcceptanceUnit: Send + Sync {
    async fn accept(&self, cmd: AcceptInvitation) -> RepoResult<GroupMembership>;

    /// Same membership + counter writes without an invitation (direct join
    /// to a public group)
    async fn join(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        membership_id: Uuid,
    ) -> RepoResult<GroupMembership>;
}

// ============================================================================
// User Stats Repository
// ============================================================================

#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    /// Adjust a user's joined-groups counter (upsert, clamped at zero)
    async fn adjust_joined_count(&self, user_id: Uuid, delta: i32) -> RepoResult<()>;

    /// Read the current joined-groups counter (0 if absent)
    async fn joined_count(&self, user_id: Uuid) -> RepoResult<i32>;
}

// ============================================================================
// User Directory (external collaborator, read-only)
// ============================================================================

/// Display info resolved from the identity subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDisplay {
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar: Option<String>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve display info for a user id; `None` for unknown users
    async fn display(&self, user_id: Uuid) -> RepoResult<Option<UserDisplay>>;
}

// ============================================================================
// Event Publisher (external collaborator, fire-and-forget)
// ============================================================================

/// Post-commit event emission toward the notification subsystem.
///
/// Best-effort by contract: implementations log failures and never surface
/// them to the operation that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent);
}
