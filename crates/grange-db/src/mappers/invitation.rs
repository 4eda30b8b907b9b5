//! Invitation entity <-> model mapper

use grange_core::error::DomainError;
use grange_core::{GroupInvitation, InviteCode};

use crate::models::GroupInvitationModel;

impl TryFrom<GroupInvitationModel> for GroupInvitation {
    type Error = DomainError;

    fn try_from(model: GroupInvitationModel) -> Result<Self, Self::Error> {
        let code = InviteCode::parse(&model.code)
            .map_err(|e| DomainError::DatabaseError(format!("invalid stored invite code: {e}")))?;
        let status = model.status.parse().map_err(DomainError::DatabaseError)?;

        Ok(GroupInvitation {
            id: model.id,
            code,
            group_id: model.group_id,
            invited_by: model.invited_by,
            invited_user: model.invited_user,
            status,
            max_uses: model.max_uses,
            used_count: model.used_count,
            expires_at: model.expires_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use grange_core::InvitationStatus;
    use uuid::Uuid;

    fn model() -> GroupInvitationModel {
        GroupInvitationModel {
            id: Uuid::new_v4(),
            code: "FARM1234".to_string(),
            group_id: Uuid::new_v4(),
            invited_by: Uuid::new_v4(),
            invited_user: None,
            status: "pending".to_string(),
            max_uses: 5,
            used_count: 2,
            expires_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_maps_code_invite() {
        let invite = GroupInvitation::try_from(model()).unwrap();
        assert_eq!(invite.code.as_str(), "FARM1234");
        assert_eq!(invite.status, InvitationStatus::Pending);
        assert!(!invite.is_direct());
        assert_eq!(invite.remaining_uses(), 3);
    }

    #[test]
    fn test_rejects_bad_status() {
        let mut m = model();
        m.status = "revoked".to_string();
        assert!(GroupInvitation::try_from(m).is_err());
    }
}
