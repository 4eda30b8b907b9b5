//! Request DTOs for service operations
//!
//! All request DTOs implement `Deserialize` and, where they carry free-form
//! input, `Validate`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use grange_core::{GroupPrivacy, GroupRole};

// ============================================================================
// Group Requests
// ============================================================================

/// Create group request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 3, max = 100, message = "Group name must be 3-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub privacy: GroupPrivacy,
}

/// Update group request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 3, max = 100, message = "Group name must be 3-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub privacy: Option<GroupPrivacy>,
}

// ============================================================================
// Invitation Requests
// ============================================================================

/// Direct invitation request (addresses one user, single-use)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDirectInviteRequest {
    pub user_id: Uuid,
}

/// Shareable code invitation request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateCodeInviteRequest {
    /// Use budget; defaults to 1
    #[validate(range(min = 1, max = 100, message = "Max uses must be 1-100"))]
    pub max_uses: Option<i32>,

    /// Expiry instant; must be in the future when supplied
    pub expires_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Membership Requests
// ============================================================================

/// Ban request with the mandatory reason
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BanMemberRequest {
    #[validate(length(min = 1, max = 500, message = "Ban reason must be 1-500 characters"))]
    pub reason: String,
}

/// Role change request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: GroupRole,
}

/// Notification preference update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNotificationsRequest {
    pub new_posts: Option<bool>,
    pub events: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_name_length() {
        let req = CreateGroupRequest {
            name: "ab".to_string(),
            description: None,
            privacy: GroupPrivacy::Public,
        };
        assert!(req.validate().is_err());

        let req = CreateGroupRequest {
            name: "Cider Orchard Collective".to_string(),
            description: None,
            privacy: GroupPrivacy::Public,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_max_uses_range() {
        let req = CreateCodeInviteRequest {
            max_uses: Some(0),
            expires_at: None,
        };
        assert!(req.validate().is_err());

        let req = CreateCodeInviteRequest {
            max_uses: Some(101),
            expires_at: None,
        };
        assert!(req.validate().is_err());

        let req = CreateCodeInviteRequest {
            max_uses: Some(25),
            expires_at: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_ban_reason_required() {
        let req = BanMemberRequest {
            reason: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_deserialize_privacy_default() {
        let req: CreateGroupRequest =
            serde_json::from_str(r#"{"name": "Goat Herders United"}"#).unwrap();
        assert_eq!(req.privacy, GroupPrivacy::Public);
    }
}
