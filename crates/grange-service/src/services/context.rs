//! Service context - dependency container for services
//!
//! Holds the repository ports, the acceptance unit, the event publisher,
//! and the invitation policy needed by services.

use std::sync::Arc;

use grange_common::config::InviteConfig;
use grange_core::traits::{
    AcceptanceUnit, EventPublisher, GroupRepository, InvitationRepository, MembershipRepository,
    UserDirectory, UserStatsRepository,
};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Repository ports (groups, memberships, invitations, user stats)
/// - The transactional acceptance unit
/// - The read-only user directory
/// - The post-commit event publisher
/// - Invitation policy defaults
#[derive(Clone)]
pub struct ServiceContext {
    groups: Arc<dyn GroupRepository>,
    memberships: Arc<dyn MembershipRepository>,
    invitations: Arc<dyn InvitationRepository>,
    acceptance: Arc<dyn AcceptanceUnit>,
    user_stats: Arc<dyn UserStatsRepository>,
    user_directory: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,
    invite_config: InviteConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        memberships: Arc<dyn MembershipRepository>,
        invitations: Arc<dyn InvitationRepository>,
        acceptance: Arc<dyn AcceptanceUnit>,
        user_stats: Arc<dyn UserStatsRepository>,
        user_directory: Arc<dyn UserDirectory>,
        publisher: Arc<dyn EventPublisher>,
        invite_config: InviteConfig,
    ) -> Self {
        Self {
            groups,
            memberships,
            invitations,
            acceptance,
            user_stats,
            user_directory,
            publisher,
            invite_config,
        }
    }

    /// Get the group repository
    pub fn groups(&self) -> &dyn GroupRepository {
        self.groups.as_ref()
    }

    /// Get the membership repository
    pub fn memberships(&self) -> &dyn MembershipRepository {
        self.memberships.as_ref()
    }

    /// Get the invitation repository
    pub fn invitations(&self) -> &dyn InvitationRepository {
        self.invitations.as_ref()
    }

    /// Get the acceptance unit
    pub fn acceptance(&self) -> &dyn AcceptanceUnit {
        self.acceptance.as_ref()
    }

    /// Get the user stats repository
    pub fn user_stats(&self) -> &dyn UserStatsRepository {
        self.user_stats.as_ref()
    }

    /// Get the user directory
    pub fn user_directory(&self) -> &dyn UserDirectory {
        self.user_directory.as_ref()
    }

    /// Get the event publisher
    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// Get the invitation policy
    pub fn invite_config(&self) -> &InviteConfig {
        &self.invite_config
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("invite_config", &self.invite_config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    groups: Option<Arc<dyn GroupRepository>>,
    memberships: Option<Arc<dyn MembershipRepository>>,
    invitations: Option<Arc<dyn InvitationRepository>>,
    acceptance: Option<Arc<dyn AcceptanceUnit>>,
    user_stats: Option<Arc<dyn UserStatsRepository>>,
    user_directory: Option<Arc<dyn UserDirectory>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    invite_config: Option<InviteConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(mut self, repo: Arc<dyn GroupRepository>) -> Self {
        self.groups = Some(repo);
        self
    }

    pub fn memberships(mut self, repo: Arc<dyn MembershipRepository>) -> Self {
        self.memberships = Some(repo);
        self
    }

    pub fn invitations(mut self, repo: Arc<dyn InvitationRepository>) -> Self {
        self.invitations = Some(repo);
        self
    }

    pub fn acceptance(mut self, unit: Arc<dyn AcceptanceUnit>) -> Self {
        self.acceptance = Some(unit);
        self
    }

    pub fn user_stats(mut self, repo: Arc<dyn UserStatsRepository>) -> Self {
        self.user_stats = Some(repo);
        self
    }

    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn invite_config(mut self, config: InviteConfig) -> Self {
        self.invite_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext::new(
            self.groups
                .ok_or_else(|| ServiceError::validation("groups repository is required"))?,
            self.memberships
                .ok_or_else(|| ServiceError::validation("memberships repository is required"))?,
            self.invitations
                .ok_or_else(|| ServiceError::validation("invitations repository is required"))?,
            self.acceptance
                .ok_or_else(|| ServiceError::validation("acceptance unit is required"))?,
            self.user_stats
                .ok_or_else(|| ServiceError::validation("user stats repository is required"))?,
            self.user_directory
                .ok_or_else(|| ServiceError::validation("user directory is required"))?,
            self.publisher
                .ok_or_else(|| ServiceError::validation("event publisher is required"))?,
            self.invite_config.unwrap_or_default(),
        ))
    }
}
