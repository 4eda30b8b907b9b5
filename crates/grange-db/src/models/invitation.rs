//! Invitation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the group_invitations table
#[derive(Debug, Clone, FromRow)]
pub struct GroupInvitationModel {
    pub id: Uuid,
    pub code: String,
    pub group_id: Uuid,
    pub invited_by: Uuid,
    pub invited_user: Option<Uuid>,
    pub status: String,
    pub max_uses: i32,
    pub used_count: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
