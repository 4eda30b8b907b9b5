//! In-memory implementations of the grange-core ports for service tests.
//!
//! The mocks mirror the conditional-update semantics of the SQL layer:
//! guarded status transitions, bounded invitation consumption, clamped
//! counters, and uniqueness of `(group_id, user_id)` and invite codes.
//! The acceptance unit validates every precondition before mutating
//! anything, matching the all-or-nothing contract of the transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use grange_common::config::InviteConfig;
use grange_core::traits::{
    AcceptInvitation, AcceptanceUnit, EventPublisher, GroupRepository, InvitationRepository,
    MembershipRepository, RepoResult, UserDirectory, UserDisplay, UserStatsRepository,
};
use grange_core::{
    DomainError, DomainEvent, Group, GroupInvitation, GroupMembership, GroupRole,
    InvitationStatus, InviteCode, MembershipStatus, NotificationPrefs,
};
use grange_service::{ServiceContext, ServiceContextBuilder};

/// Shared backing store for all mock ports
#[derive(Default)]
pub struct InMemoryStore {
    pub groups: Mutex<HashMap<Uuid, Group>>,
    pub memberships: Mutex<HashMap<Uuid, GroupMembership>>,
    pub invitations: Mutex<HashMap<Uuid, GroupInvitation>>,
    pub joined_counts: Mutex<HashMap<Uuid, i32>>,
    pub users: Mutex<HashMap<Uuid, UserDisplay>>,
    pub events: Mutex<Vec<DomainEvent>>,
}

impl InMemoryStore {
    pub fn membership_of(&self, group_id: Uuid, user_id: Uuid) -> Option<GroupMembership> {
        self.memberships
            .lock()
            .unwrap()
            .values()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned()
    }

    pub fn group(&self, group_id: Uuid) -> Option<Group> {
        self.groups.lock().unwrap().get(&group_id).cloned()
    }

    pub fn invitation_by_code(&self, code: &str) -> Option<GroupInvitation> {
        self.invitations
            .lock()
            .unwrap()
            .values()
            .find(|i| i.code.as_str() == code)
            .cloned()
    }

    pub fn joined_count(&self, user_id: Uuid) -> i32 {
        self.joined_counts
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn active_member_count(&self, group_id: Uuid) -> i32 {
        self.memberships
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.group_id == group_id && m.is_active())
            .count() as i32
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(DomainEvent::event_type)
            .collect()
    }
}

// ============================================================================
// Group repository
// ============================================================================

pub struct MockGroupRepository(pub Arc<InMemoryStore>);

#[async_trait]
impl GroupRepository for MockGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Group>> {
        Ok(self
            .0
            .groups
            .lock()
            .unwrap()
            .get(&id)
            .filter(|g| g.is_active)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Group>> {
        Ok(self
            .0
            .groups
            .lock()
            .unwrap()
            .values()
            .find(|g| g.slug == slug && g.is_active)
            .cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Group>> {
        let memberships = self.0.memberships.lock().unwrap();
        let groups = self.0.groups.lock().unwrap();
        Ok(memberships
            .values()
            .filter(|m| m.user_id == user_id && m.is_active())
            .filter_map(|m| groups.get(&m.group_id))
            .filter(|g| g.is_active)
            .cloned()
            .collect())
    }

    async fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        Ok(self
            .0
            .groups
            .lock()
            .unwrap()
            .values()
            .any(|g| g.slug == slug))
    }

    async fn create_with_owner(
        &self,
        group: &Group,
        owner_membership: &GroupMembership,
    ) -> RepoResult<()> {
        {
            let mut groups = self.0.groups.lock().unwrap();
            if groups.values().any(|g| g.slug == group.slug) {
                return Err(DomainError::SlugConflict);
            }
            groups.insert(group.id, group.clone());
        }
        self.0
            .memberships
            .lock()
            .unwrap()
            .insert(owner_membership.id, owner_membership.clone());
        *self
            .0
            .joined_counts
            .lock()
            .unwrap()
            .entry(owner_membership.user_id)
            .or_insert(0) += 1;
        Ok(())
    }

    async fn update(&self, group: &Group) -> RepoResult<()> {
        let mut groups = self.0.groups.lock().unwrap();
        if groups
            .values()
            .any(|g| g.slug == group.slug && g.id != group.id)
        {
            return Err(DomainError::SlugConflict);
        }
        match groups.get_mut(&group.id).filter(|g| g.is_active) {
            Some(existing) => {
                existing.name = group.name.clone();
                existing.slug = group.slug.clone();
                existing.description = group.description.clone();
                existing.privacy = group.privacy;
                existing.updated_at = Utc::now();
                Ok(())
            }
            None => Err(DomainError::group_not_found(group.id)),
        }
    }

    async fn deactivate(&self, id: Uuid) -> RepoResult<()> {
        match self
            .0
            .groups
            .lock()
            .unwrap()
            .get_mut(&id)
            .filter(|g| g.is_active)
        {
            Some(group) => {
                group.is_active = false;
                Ok(())
            }
            None => Err(DomainError::group_not_found(id)),
        }
    }

    async fn adjust_member_count(&self, group_id: Uuid, delta: i32) -> RepoResult<()> {
        match self.0.groups.lock().unwrap().get_mut(&group_id) {
            Some(group) => {
                group.member_count = (group.member_count + delta).max(0);
                Ok(())
            }
            None => Err(DomainError::group_not_found(group_id)),
        }
    }
}

// ============================================================================
// Membership repository
// ============================================================================

pub struct MockMembershipRepository(pub Arc<InMemoryStore>);

impl MockMembershipRepository {
    fn with_record<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut GroupMembership) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut memberships = self.0.memberships.lock().unwrap();
        match memberships.get_mut(&id) {
            Some(membership) => f(membership),
            None => Err(DomainError::MembershipNotFound),
        }
    }
}

#[async_trait]
impl MembershipRepository for MockMembershipRepository {
    async fn find(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<Option<GroupMembership>> {
        Ok(self.0.membership_of(group_id, user_id))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<GroupMembership>> {
        Ok(self.0.memberships.lock().unwrap().get(&id).cloned())
    }

    async fn is_active_member(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        Ok(self
            .0
            .membership_of(group_id, user_id)
            .is_some_and(|m| m.is_active()))
    }

    async fn find_by_group(
        &self,
        group_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> RepoResult<Vec<GroupMembership>> {
        let mut members: Vec<GroupMembership> = self
            .0
            .memberships
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.group_id == group_id && m.is_active())
            .filter(|m| after.is_none_or(|cursor| m.user_id > cursor))
            .cloned()
            .collect();
        members.sort_by_key(|m| m.user_id);
        members.truncate(limit.clamp(1, 1000) as usize);
        Ok(members)
    }

    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<GroupMembership>> {
        Ok(self
            .0
            .memberships
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_staff(&self, group_id: Uuid) -> RepoResult<Vec<GroupMembership>> {
        Ok(self
            .0
            .memberships
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.group_id == group_id && m.is_staff())
            .cloned()
            .collect())
    }

    async fn create(&self, membership: &GroupMembership) -> RepoResult<()> {
        let mut memberships = self.0.memberships.lock().unwrap();
        if memberships
            .values()
            .any(|m| m.group_id == membership.group_id && m.user_id == membership.user_id)
        {
            return Err(DomainError::AlreadyMember);
        }
        memberships.insert(membership.id, membership.clone());
        Ok(())
    }

    async fn reactivate(&self, id: Uuid, invited_by: Option<Uuid>) -> RepoResult<GroupMembership> {
        self.with_record(id, |m| {
            if m.status != MembershipStatus::Left {
                return Err(DomainError::InvalidTransition {
                    from: m.status.as_str().to_string(),
                    to: "active".to_string(),
                });
            }
            m.activate(invited_by)?;
            Ok(m.clone())
        })
    }

    async fn ban(&self, id: Uuid, banned_by: Uuid, reason: &str) -> RepoResult<()> {
        self.with_record(id, |m| m.ban(banned_by, reason.to_string()))
    }

    async fn unban(&self, id: Uuid) -> RepoResult<()> {
        self.with_record(id, |m| {
            if !matches!(m.status, MembershipStatus::Banned(_)) {
                return Err(DomainError::InvalidTransition {
                    from: m.status.as_str().to_string(),
                    to: "active".to_string(),
                });
            }
            m.activate(None)
        })
    }

    async fn mark_left(&self, id: Uuid) -> RepoResult<()> {
        self.with_record(id, GroupMembership::mark_left)
    }

    async fn approve(&self, id: Uuid) -> RepoResult<()> {
        self.with_record(id, |m| {
            if m.status != MembershipStatus::Pending {
                return Err(DomainError::InvalidTransition {
                    from: m.status.as_str().to_string(),
                    to: "active".to_string(),
                });
            }
            m.activate(None)
        })
    }

    async fn delete_pending(&self, id: Uuid) -> RepoResult<()> {
        let mut memberships = self.0.memberships.lock().unwrap();
        match memberships.get(&id) {
            Some(m) if m.status == MembershipStatus::Pending => {
                memberships.remove(&id);
                Ok(())
            }
            _ => Err(DomainError::MembershipNotFound),
        }
    }

    async fn update_role(&self, id: Uuid, role: GroupRole) -> RepoResult<()> {
        self.with_record(id, |m| {
            m.role = role;
            Ok(())
        })
    }

    async fn update_notifications(&self, id: Uuid, prefs: NotificationPrefs) -> RepoResult<()> {
        self.with_record(id, |m| {
            m.notifications = prefs;
            Ok(())
        })
    }

    async fn touch_activity(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        let mut memberships = self.0.memberships.lock().unwrap();
        if let Some(m) = memberships
            .values_mut()
            .find(|m| m.group_id == group_id && m.user_id == user_id && m.is_active())
        {
            m.touch();
        }
        Ok(())
    }
}

// ============================================================================
// Invitation repository
// ============================================================================

pub struct MockInvitationRepository(pub Arc<InMemoryStore>);

#[async_trait]
impl InvitationRepository for MockInvitationRepository {
    async fn find_by_code(&self, code: &InviteCode) -> RepoResult<Option<GroupInvitation>> {
        Ok(self.0.invitation_by_code(code.as_str()))
    }

    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<GroupInvitation>> {
        Ok(self
            .0
            .invitations
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn find_pending_direct(
        &self,
        group_id: Uuid,
        invited_user: Uuid,
    ) -> RepoResult<Option<GroupInvitation>> {
        Ok(self
            .0
            .invitations
            .lock()
            .unwrap()
            .values()
            .find(|i| {
                i.group_id == group_id
                    && i.invited_user == Some(invited_user)
                    && i.status == InvitationStatus::Pending
            })
            .cloned())
    }

    async fn create(&self, invitation: &GroupInvitation) -> RepoResult<()> {
        let mut invitations = self.0.invitations.lock().unwrap();
        if invitations
            .values()
            .any(|i| i.code.as_str() == invitation.code.as_str())
        {
            return Err(DomainError::InviteCodeExists);
        }
        invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn expire(&self, id: Uuid) -> RepoResult<()> {
        let mut invitations = self.0.invitations.lock().unwrap();
        match invitations.get_mut(&id) {
            Some(invitation) if invitation.status == InvitationStatus::Pending => {
                invitation.status = InvitationStatus::Expired;
                Ok(())
            }
            _ => Err(DomainError::InviteNotPending),
        }
    }
}

// ============================================================================
// Acceptance unit
// ============================================================================

pub struct MockAcceptanceUnit(pub Arc<InMemoryStore>);

impl MockAcceptanceUnit {
    /// Validate-then-mutate: nothing is written unless every guard holds,
    /// which is the in-memory equivalent of a rolled-back transaction.
    fn upsert_active(
        &self,
        membership_id: Uuid,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
        invited_by: Option<Uuid>,
    ) -> RepoResult<GroupMembership> {
        {
            let groups = self.0.groups.lock().unwrap();
            if !groups.get(&group_id).is_some_and(|g| g.is_active) {
                return Err(DomainError::group_not_found(group_id));
            }
        }

        let mut memberships = self.0.memberships.lock().unwrap();
        let existing_id = memberships
            .values()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .map(|m| (m.id, m.status.clone()));

        let membership = match existing_id {
            Some((id, MembershipStatus::Left)) => {
                let record = memberships.get_mut(&id).expect("record just found");
                record.role = role;
                record.activate(invited_by)?;
                record.clone()
            }
            Some(_) => return Err(DomainError::AlreadyMember),
            None => {
                let record = GroupMembership::new(membership_id, group_id, user_id, role, invited_by);
                memberships.insert(membership_id, record.clone());
                record
            }
        };
        drop(memberships);

        if let Some(group) = self.0.groups.lock().unwrap().get_mut(&group_id) {
            group.member_count += 1;
        }
        *self
            .0
            .joined_counts
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert(0) += 1;

        Ok(membership)
    }
}

#[async_trait]
impl AcceptanceUnit for MockAcceptanceUnit {
    async fn accept(&self, cmd: AcceptInvitation) -> RepoResult<GroupMembership> {
        // Invitation consumption is the bounded step; check it first so a
        // spent budget leaves no other writes behind.
        {
            let invitations = self.0.invitations.lock().unwrap();
            let invitation = invitations
                .get(&cmd.invitation_id)
                .ok_or_else(|| DomainError::InvitationNotFound(cmd.invitation_id.to_string()))?;
            if invitation.status != InvitationStatus::Pending
                || invitation.used_count >= invitation.max_uses
                || invitation.expires_at <= Utc::now()
            {
                return Err(DomainError::InviteExhausted);
            }
        }

        let membership = self.upsert_active(
            cmd.membership_id,
            cmd.group_id,
            cmd.user_id,
            cmd.role,
            Some(cmd.invited_by),
        )?;

        if let Some(invitation) = self.0.invitations.lock().unwrap().get_mut(&cmd.invitation_id) {
            invitation.consume();
        }

        Ok(membership)
    }

    async fn join(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        membership_id: Uuid,
    ) -> RepoResult<GroupMembership> {
        self.upsert_active(membership_id, group_id, user_id, GroupRole::Member, None)
    }
}

// ============================================================================
// User stats / directory / publisher
// ============================================================================

pub struct MockUserStatsRepository(pub Arc<InMemoryStore>);

#[async_trait]
impl UserStatsRepository for MockUserStatsRepository {
    async fn adjust_joined_count(&self, user_id: Uuid, delta: i32) -> RepoResult<()> {
        let mut counts = self.0.joined_counts.lock().unwrap();
        let entry = counts.entry(user_id).or_insert(0);
        *entry = (*entry + delta).max(0);
        Ok(())
    }

    async fn joined_count(&self, user_id: Uuid) -> RepoResult<i32> {
        Ok(self.0.joined_count(user_id))
    }
}

pub struct MockUserDirectory(pub Arc<InMemoryStore>);

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn display(&self, user_id: Uuid) -> RepoResult<Option<UserDisplay>> {
        Ok(self.0.users.lock().unwrap().get(&user_id).cloned())
    }
}

pub struct RecordingPublisher(pub Arc<InMemoryStore>);

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &DomainEvent) {
        self.0.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// Context factory
// ============================================================================

/// Build a ServiceContext wired to a shared in-memory store
pub fn test_context() -> (ServiceContext, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());

    let ctx = ServiceContextBuilder::new()
        .groups(Arc::new(MockGroupRepository(store.clone())))
        .memberships(Arc::new(MockMembershipRepository(store.clone())))
        .invitations(Arc::new(MockInvitationRepository(store.clone())))
        .acceptance(Arc::new(MockAcceptanceUnit(store.clone())))
        .user_stats(Arc::new(MockUserStatsRepository(store.clone())))
        .user_directory(Arc::new(MockUserDirectory(store.clone())))
        .publisher(Arc::new(RecordingPublisher(store.clone())))
        .invite_config(InviteConfig::default())
        .build()
        .expect("all mocks provided");

    (ctx, store)
}
