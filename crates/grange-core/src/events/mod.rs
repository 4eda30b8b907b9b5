//! Domain events

mod domain_event;

pub use domain_event::{
    DomainEvent, GroupCreatedEvent, GroupDeactivatedEvent, GroupUpdatedEvent, InviteIssuedEvent,
    InviteRevokedEvent, JoinRequestApprovedEvent, JoinRequestRejectedEvent, JoinRequestedEvent,
    MemberBannedEvent, MemberJoinedEvent, MemberLeftEvent, MemberRoleChangedEvent,
    MemberUnbannedEvent,
};
