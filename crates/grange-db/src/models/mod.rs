//! Database models (SQLx `FromRow` structs)

mod group;
mod invitation;
mod membership;
mod user;

pub use group::GroupModel;
pub use invitation::GroupInvitationModel;
pub use membership::GroupMembershipModel;
pub use user::{UserDisplayModel, UserGroupStatsModel};
