//! Data transfer objects for the service API

mod mappers;
mod requests;
mod responses;

pub use requests::{
    BanMemberRequest, CreateCodeInviteRequest, CreateDirectInviteRequest, CreateGroupRequest,
    UpdateGroupRequest, UpdateMemberRoleRequest, UpdateNotificationsRequest,
};
pub use responses::{BanDetail, GroupResponse, InvitationResponse, MembershipResponse};
