//! Response DTOs for service operations
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use grange_core::{GroupPrivacy, GroupRole, NotificationPrefs, UserDisplay};

// ============================================================================
// Group Responses
// ============================================================================

/// Group response
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub privacy: GroupPrivacy,
    pub owner_id: Uuid,
    pub member_count: i32,
    pub post_count: i32,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Membership Responses
// ============================================================================

/// Ban detail, present only for banned memberships
#[derive(Debug, Clone, Serialize)]
pub struct BanDetail {
    pub reason: String,
    pub banned_by: Uuid,
    pub banned_at: DateTime<Utc>,
}

/// Membership response, optionally carrying the member's display info
#[derive(Debug, Clone, Serialize)]
pub struct MembershipResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub status: &'static str,
    pub is_staff: bool,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban: Option<BanDetail>,
    pub last_activity_at: DateTime<Utc>,
    pub notifications: NotificationPrefs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDisplay>,
}

// ============================================================================
// Invitation Responses
// ============================================================================

/// Invitation response
#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub code: String,
    pub group_id: Uuid,
    pub invited_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_user: Option<Uuid>,
    pub status: &'static str,
    pub max_uses: i32,
    pub used_count: i32,
    pub remaining_uses: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
