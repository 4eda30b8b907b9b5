//! # grange-service
//!
//! Application layer for the group membership and invitation engine:
//! service context, role authorization, and the group / membership /
//! invitation use cases, plus the request/response DTOs.

pub mod dto;
pub mod services;

// Re-export the service API surface
pub use dto::{
    BanMemberRequest, CreateCodeInviteRequest, CreateDirectInviteRequest, CreateGroupRequest,
    GroupResponse, InvitationResponse, MembershipResponse, UpdateGroupRequest,
    UpdateMemberRoleRequest, UpdateNotificationsRequest,
};
pub use services::{
    GroupService, InvitationService, MembershipService, RoleAuthorizer, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult,
};
