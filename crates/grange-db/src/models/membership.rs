//! Membership database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the group_memberships table
///
/// Ban metadata is three nullable columns here; the mapper folds them into
/// the tagged status enum and rejects rows that violate the pairing.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMembershipModel {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    pub invited_by: Option<Uuid>,
    pub ban_reason: Option<String>,
    pub banned_by: Option<Uuid>,
    pub banned_at: Option<DateTime<Utc>>,
    pub last_activity_at: DateTime<Utc>,
    pub notify_new_posts: bool,
    pub notify_events: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
