//! Membership entity <-> model mapper

use grange_core::error::DomainError;
use grange_core::{BanInfo, GroupMembership, MembershipStatus, NotificationPrefs};

use crate::models::GroupMembershipModel;

/// Convert a membership row into the domain entity.
///
/// Reassembles the tagged status from the status column plus the three ban
/// columns; a `banned` row with incomplete metadata is a storage corruption
/// and maps to a database error.
pub fn membership_from_model(model: GroupMembershipModel) -> Result<GroupMembership, DomainError> {
    let role = model.role.parse().map_err(DomainError::DatabaseError)?;

    let status = match model.status.as_str() {
        "active" => MembershipStatus::Active,
        "pending" => MembershipStatus::Pending,
        "left" => MembershipStatus::Left,
        "banned" => match (model.ban_reason, model.banned_by, model.banned_at) {
            (Some(reason), Some(banned_by), Some(banned_at)) => MembershipStatus::Banned(BanInfo {
                reason,
                banned_by,
                banned_at,
            }),
            _ => {
                return Err(DomainError::DatabaseError(format!(
                    "membership {} is banned but ban metadata is incomplete",
                    model.id
                )))
            }
        },
        other => {
            return Err(DomainError::DatabaseError(format!(
                "unknown membership status: {other}"
            )))
        }
    };

    Ok(GroupMembership {
        id: model.id,
        group_id: model.group_id,
        user_id: model.user_id,
        role,
        status,
        joined_at: model.joined_at,
        invited_by: model.invited_by,
        last_activity_at: model.last_activity_at,
        notifications: NotificationPrefs {
            new_posts: model.notify_new_posts,
            events: model.notify_events,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl TryFrom<GroupMembershipModel> for GroupMembership {
    type Error = DomainError;

    fn try_from(model: GroupMembershipModel) -> Result<Self, Self::Error> {
        membership_from_model(model)
    }
}
