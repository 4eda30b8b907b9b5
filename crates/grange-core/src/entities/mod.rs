//! Domain entities

mod group;
mod invitation;
mod membership;

pub use group::Group;
pub use invitation::{GroupInvitation, InvitationStatus};
pub use membership::{BanInfo, GroupMembership, MembershipStatus, NotificationPrefs};
