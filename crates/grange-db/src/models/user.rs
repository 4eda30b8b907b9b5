//! User-related database models
//!
//! The users table belongs to the identity subsystem; this engine only
//! reads display columns from it. The stats row is owned here.

use sqlx::FromRow;
use uuid::Uuid;

/// Read-only display projection of the external users table
#[derive(Debug, Clone, FromRow)]
pub struct UserDisplayModel {
    pub id: Uuid,
    pub display_name: String,
    pub avatar: Option<String>,
}

/// Database model for the user_group_stats table
#[derive(Debug, Clone, FromRow)]
pub struct UserGroupStatsModel {
    pub user_id: Uuid,
    pub joined_group_count: i32,
}
