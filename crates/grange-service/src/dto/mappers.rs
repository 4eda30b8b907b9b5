//! Entity -> response DTO mappers

use grange_core::{
    Group, GroupInvitation, GroupMembership, MembershipStatus, UserDisplay,
};

use super::responses::{BanDetail, GroupResponse, InvitationResponse, MembershipResponse};

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
            privacy: group.privacy,
            owner_id: group.owner_id,
            member_count: group.member_count,
            post_count: group.post_count,
            created_at: group.created_at,
        }
    }
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self::from(&group)
    }
}

impl MembershipResponse {
    /// Build a response, optionally attaching resolved display info
    pub fn from_membership(membership: &GroupMembership, user: Option<UserDisplay>) -> Self {
        let ban = match &membership.status {
            MembershipStatus::Banned(info) => Some(BanDetail {
                reason: info.reason.clone(),
                banned_by: info.banned_by,
                banned_at: info.banned_at,
            }),
            _ => None,
        };

        Self {
            id: membership.id,
            group_id: membership.group_id,
            user_id: membership.user_id,
            role: membership.role,
            status: membership.status.as_str(),
            is_staff: membership.is_staff(),
            joined_at: membership.joined_at,
            invited_by: membership.invited_by,
            ban,
            last_activity_at: membership.last_activity_at,
            notifications: membership.notifications,
            user,
        }
    }
}

impl From<&GroupMembership> for MembershipResponse {
    fn from(membership: &GroupMembership) -> Self {
        Self::from_membership(membership, None)
    }
}

impl From<&GroupInvitation> for InvitationResponse {
    fn from(invitation: &GroupInvitation) -> Self {
        Self {
            id: invitation.id,
            code: invitation.code.as_str().to_string(),
            group_id: invitation.group_id,
            invited_by: invitation.invited_by,
            invited_user: invitation.invited_user,
            status: invitation.status.as_str(),
            max_uses: invitation.max_uses,
            used_count: invitation.used_count,
            remaining_uses: invitation.remaining_uses(),
            expires_at: invitation.expires_at,
            created_at: invitation.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grange_core::{GroupPrivacy, GroupRole};
    use uuid::Uuid;

    #[test]
    fn test_membership_response_carries_ban_detail() {
        let mut membership = GroupMembership::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            GroupRole::Member,
            None,
        );
        let admin = Uuid::new_v4();
        membership.ban(admin, "flooding the feed".to_string()).unwrap();

        let response = MembershipResponse::from(&membership);
        assert_eq!(response.status, "banned");
        let ban = response.ban.expect("ban detail");
        assert_eq!(ban.banned_by, admin);
        assert!(!response.is_staff);
    }

    #[test]
    fn test_group_response() {
        let group = Group::new(
            Uuid::new_v4(),
            "Terrace Vineyards".to_string(),
            "terrace-vineyards".to_string(),
            GroupPrivacy::Private,
            Uuid::new_v4(),
        );
        let response = GroupResponse::from(&group);
        assert_eq!(response.slug, "terrace-vineyards");
        assert_eq!(response.privacy, GroupPrivacy::Private);
    }
}
