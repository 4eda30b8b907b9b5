//! Membership entity - a user's relationship to a group
//!
//! One record per `(group, user)` pair for the life of the relationship.
//! Records are never deleted (a rejected pending request is the single
//! exception); leaving or being banned mutates the status and the record is
//! reactivated on rejoin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::GroupRole;

/// Ban metadata, present only while a membership is banned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanInfo {
    pub reason: String,
    pub banned_by: Uuid,
    pub banned_at: DateTime<Utc>,
}

/// Membership status with status-specific payload
///
/// Ban metadata lives inside the `Banned` variant so a non-banned record
/// cannot carry stale ban fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Pending,
    Banned(BanInfo),
    Left,
}

impl MembershipStatus {
    /// Database / wire tag for the status, without payload
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Banned(_) => "banned",
            Self::Left => "left",
        }
    }
}

/// Per-member notification toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub new_posts: bool,
    pub events: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            new_posts: true,
            events: true,
        }
    }
}

/// Group membership entity (junction between a user and a group)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub status: MembershipStatus,
    pub joined_at: DateTime<Utc>,
    pub invited_by: Option<Uuid>,
    pub last_activity_at: DateTime<Utc>,
    pub notifications: NotificationPrefs,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupMembership {
    /// Create a new active membership
    pub fn new(
        id: Uuid,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
        invited_by: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            group_id,
            user_id,
            role,
            status: MembershipStatus::Active,
            joined_at: now,
            invited_by,
            last_activity_at: now,
            notifications: NotificationPrefs::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a pending join request (private groups)
    pub fn pending(id: Uuid, group_id: Uuid, user_id: Uuid) -> Self {
        let mut membership = Self::new(id, group_id, user_id, GroupRole::Member, None);
        membership.status = MembershipStatus::Pending;
        membership
    }

    /// Whether the membership is currently active
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.status, MembershipStatus::Active)
    }

    /// Whether the member is active staff (moderator or above)
    ///
    /// Computed on demand; never stored.
    #[inline]
    pub fn is_staff(&self) -> bool {
        self.is_active() && self.role.at_least(GroupRole::Moderator)
    }

    /// Whether the member may moderate content in the group
    #[inline]
    pub fn can_moderate(&self) -> bool {
        self.is_staff()
    }

    /// Transition to active from `Pending`, `Left`, or `Banned`.
    ///
    /// Rejoining (`Left`) refreshes `joined_at` and overwrites invite
    /// provenance; leaving `Banned` clears ban metadata by construction.
    pub fn activate(&mut self, invited_by: Option<Uuid>) -> Result<(), DomainError> {
        match self.status {
            MembershipStatus::Pending | MembershipStatus::Banned(_) => {}
            MembershipStatus::Left => {
                self.joined_at = Utc::now();
                self.invited_by = invited_by;
            }
            MembershipStatus::Active => {
                return Err(self.invalid_transition("active"));
            }
        }
        self.status = MembershipStatus::Active;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition from `Active` to `Banned`
    pub fn ban(&mut self, banned_by: Uuid, reason: String) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(self.invalid_transition("banned"));
        }
        self.status = MembershipStatus::Banned(BanInfo {
            reason,
            banned_by,
            banned_at: Utc::now(),
        });
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition from `Active` to `Left`
    pub fn mark_left(&mut self) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(self.invalid_transition("left"));
        }
        self.status = MembershipStatus::Left;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record activity in the group
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    fn invalid_transition(&self, to: &str) -> DomainError {
        DomainError::InvalidTransition {
            from: self.status.as_str().to_string(),
            to: to.to_string(),
        }
    }
}
