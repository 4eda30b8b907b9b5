//! Domain events - emitted after membership state changes commit
//!
//! These events feed the (external) notification subsystem. They are
//! published post-commit and best-effort: a failed emission never fails the
//! operation that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::GroupRole;

/// All membership lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Group Events
    // =========================================================================
    GroupCreated(GroupCreatedEvent),
    GroupUpdated(GroupUpdatedEvent),
    GroupDeactivated(GroupDeactivatedEvent),

    // =========================================================================
    // Membership Events
    // =========================================================================
    MemberJoined(MemberJoinedEvent),
    MemberLeft(MemberLeftEvent),
    MemberBanned(MemberBannedEvent),
    MemberUnbanned(MemberUnbannedEvent),
    MemberRoleChanged(MemberRoleChangedEvent),

    // =========================================================================
    // Join Request Events
    // =========================================================================
    JoinRequested(JoinRequestedEvent),
    JoinRequestApproved(JoinRequestApprovedEvent),
    JoinRequestRejected(JoinRequestRejectedEvent),

    // =========================================================================
    // Invitation Events
    // =========================================================================
    InviteIssued(InviteIssuedEvent),
    InviteRevoked(InviteRevokedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GroupCreated(_) => "GROUP_CREATED",
            Self::GroupUpdated(_) => "GROUP_UPDATED",
            Self::GroupDeactivated(_) => "GROUP_DEACTIVATED",
            Self::MemberJoined(_) => "MEMBER_JOINED",
            Self::MemberLeft(_) => "MEMBER_LEFT",
            Self::MemberBanned(_) => "MEMBER_BANNED",
            Self::MemberUnbanned(_) => "MEMBER_UNBANNED",
            Self::MemberRoleChanged(_) => "MEMBER_ROLE_CHANGED",
            Self::JoinRequested(_) => "JOIN_REQUESTED",
            Self::JoinRequestApproved(_) => "JOIN_REQUEST_APPROVED",
            Self::JoinRequestRejected(_) => "JOIN_REQUEST_REJECTED",
            Self::InviteIssued(_) => "INVITE_ISSUED",
            Self::InviteRevoked(_) => "INVITE_REVOKED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::GroupCreated(e) => e.timestamp,
            Self::GroupUpdated(e) => e.timestamp,
            Self::GroupDeactivated(e) => e.timestamp,
            Self::MemberJoined(e) => e.timestamp,
            Self::MemberLeft(e) => e.timestamp,
            Self::MemberBanned(e) => e.timestamp,
            Self::MemberUnbanned(e) => e.timestamp,
            Self::MemberRoleChanged(e) => e.timestamp,
            Self::JoinRequested(e) => e.timestamp,
            Self::JoinRequestApproved(e) => e.timestamp,
            Self::JoinRequestRejected(e) => e.timestamp,
            Self::InviteIssued(e) => e.timestamp,
            Self::InviteRevoked(e) => e.timestamp,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCreatedEvent {
    pub group_id: Uuid,
    pub owner_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupUpdatedEvent {
    pub group_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDeactivatedEvent {
    pub group_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberJoinedEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub invited_by: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLeftEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberBannedEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub banned_by: Uuid,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUnbannedEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub unbanned_by: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRoleChangedEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub changed_by: Uuid,
    pub role: GroupRole,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestedEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestApprovedEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub approved_by: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestRejectedEvent {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub rejected_by: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteIssuedEvent {
    pub group_id: Uuid,
    pub code: String,
    pub invited_by: Uuid,
    pub invited_user: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteRevokedEvent {
    pub group_id: Uuid,
    pub code: String,
    pub revoked_by: Uuid,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Creation Helpers
// ============================================================================

impl MemberJoinedEvent {
    pub fn new(group_id: Uuid, user_id: Uuid, invited_by: Option<Uuid>) -> Self {
        Self {
            group_id,
            user_id,
            invited_by,
            timestamp: Utc::now(),
        }
    }
}

impl GroupCreatedEvent {
    pub fn new(group_id: Uuid, owner_id: Uuid) -> Self {
        Self {
            group_id,
            owner_id,
            timestamp: Utc::now(),
        }
    }
}

impl JoinRequestedEvent {
    pub fn new(group_id: Uuid, user_id: Uuid) -> Self {
        Self {
            group_id,
            user_id,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = DomainEvent::MemberJoined(MemberJoinedEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
        ));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("MEMBER_JOINED"));

        let parsed: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type(), "MEMBER_JOINED");
    }

    #[test]
    fn test_event_type() {
        let event = DomainEvent::JoinRequested(JoinRequestedEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
        ));
        assert_eq!(event.event_type(), "JOIN_REQUESTED");
    }
}
