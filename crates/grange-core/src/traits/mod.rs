//! Repository and collaborator traits (ports)

mod repositories;

pub use repositories::{
    AcceptInvitation, AcceptanceUnit, EventPublisher, GroupRepository, InvitationRepository,
    MembershipRepository, RepoResult, UserDirectory, UserDisplay, UserStatsRepository,
};
