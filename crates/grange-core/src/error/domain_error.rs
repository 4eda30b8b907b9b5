//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

use crate::value_objects::GroupRole;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Membership not found in group")]
    MembershipNotFound,

    #[error("Invitation not found: {0}")]
    InvitationNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Expiry must be in the future")]
    ExpiryNotInFuture,

    #[error("Max uses must be between {min} and {max}")]
    InvalidMaxUses { min: i32, max: i32 },

    #[error("Cannot invite yourself")]
    CannotInviteSelf,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a member of this group")]
    NotAMember,

    #[error("Requires {required} role or above")]
    InsufficientRole { required: GroupRole },

    #[error("User is banned from this group")]
    UserBanned,

    #[error("Invitation is addressed to a different user")]
    InviteNotAddressed,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a member of this group")]
    AlreadyMember,

    #[error("A pending join request already exists")]
    JoinRequestPending,

    #[error("A pending invitation for this user already exists")]
    DuplicateInvite,

    #[error("Invite code already exists")]
    InviteCodeExists,

    #[error("Group slug already taken")]
    SlugConflict,

    #[error("Invalid membership transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Cannot leave an owned group (transfer ownership first)")]
    CannotLeaveOwnedGroup,

    #[error("Cannot ban the group owner")]
    CannotBanOwner,

    #[error("Invitation has expired")]
    InviteExpired,

    #[error("Invitation has reached maximum uses")]
    InviteExhausted,

    #[error("Invitation is no longer pending")]
    InviteNotPending,

    #[error("Group cannot be joined directly")]
    GroupNotJoinable,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Could not generate a unique invite code")]
    CodeGenerationExhausted,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Group-not-found from an id
    pub fn group_not_found(id: Uuid) -> Self {
        Self::GroupNotFound(id.to_string())
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::GroupNotFound(_) => "UNKNOWN_GROUP",
            Self::MembershipNotFound => "UNKNOWN_MEMBER",
            Self::InvitationNotFound(_) => "UNKNOWN_INVITE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ExpiryNotInFuture => "EXPIRY_NOT_IN_FUTURE",
            Self::InvalidMaxUses { .. } => "INVALID_MAX_USES",
            Self::CannotInviteSelf => "CANNOT_INVITE_SELF",

            // Authorization
            Self::NotAMember => "NOT_A_MEMBER",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::UserBanned => "USER_BANNED",
            Self::InviteNotAddressed => "INVITE_NOT_ADDRESSED",

            // Conflict
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::JoinRequestPending => "JOIN_REQUEST_PENDING",
            Self::DuplicateInvite => "DUPLICATE_INVITE",
            Self::InviteCodeExists => "INVITE_CODE_EXISTS",
            Self::SlugConflict => "SLUG_CONFLICT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",

            // Business Rules
            Self::CannotLeaveOwnedGroup => "CANNOT_LEAVE_OWNED_GROUP",
            Self::CannotBanOwner => "CANNOT_BAN_OWNER",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::InviteExhausted => "INVITE_EXHAUSTED",
            Self::InviteNotPending => "INVITE_NOT_PENDING",
            Self::GroupNotJoinable => "GROUP_NOT_JOINABLE",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CodeGenerationExhausted => "CODE_GENERATION_EXHAUSTED",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GroupNotFound(_) | Self::MembershipNotFound | Self::InvitationNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::ExpiryNotInFuture
                | Self::InvalidMaxUses { .. }
                | Self::CannotInviteSelf
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotAMember
                | Self::InsufficientRole { .. }
                | Self::UserBanned
                | Self::InviteNotAddressed
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyMember
                | Self::JoinRequestPending
                | Self::DuplicateInvite
                | Self::InviteCodeExists
                | Self::SlugConflict
                | Self::InvalidTransition { .. }
                | Self::InviteExpired
                | Self::InviteExhausted
                | Self::InviteNotPending
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::group_not_found(Uuid::nil());
        assert_eq!(err.code(), "UNKNOWN_GROUP");

        let err = DomainError::InsufficientRole {
            required: GroupRole::Admin,
        };
        assert_eq!(err.code(), "INSUFFICIENT_ROLE");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::MembershipNotFound.is_not_found());
        assert!(DomainError::InvitationNotFound("FARM1234".to_string()).is_not_found());
        assert!(!DomainError::AlreadyMember.is_not_found());
    }

    #[test]
    fn test_is_authorization() {
        assert!(DomainError::NotAMember.is_authorization());
        assert!(DomainError::UserBanned.is_authorization());
        assert!(!DomainError::InviteExpired.is_authorization());
    }

    #[test]
    fn test_is_conflict() {
        assert!(DomainError::AlreadyMember.is_conflict());
        assert!(DomainError::InviteExhausted.is_conflict());
        assert!(!DomainError::NotAMember.is_conflict());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InsufficientRole {
            required: GroupRole::Admin,
        };
        assert_eq!(err.to_string(), "Requires admin role or above");

        let err = DomainError::InvalidMaxUses { min: 1, max: 100 };
        assert_eq!(err.to_string(), "Max uses must be between 1 and 100");
    }
}
