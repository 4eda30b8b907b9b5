//! Service layer - business logic and use cases

mod authorizer;
mod context;
mod error;
mod group;
mod invitation;
mod membership;

pub use authorizer::RoleAuthorizer;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use group::GroupService;
pub use invitation::InvitationService;
pub use membership::MembershipService;
