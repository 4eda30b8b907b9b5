//! Invitation entity - an offer of group membership
//!
//! Two kinds share one record: a *direct* invitation addresses a specific
//! user and is single-use; a *code* invitation is a shareable code with a
//! use budget. Invitations are kept for audit and never physically deleted.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::InviteCode;

/// Default invitation lifetime
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Invitation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    /// Terminal state for both time/usage expiry and administrative
    /// revocation; the two causes share one value.
    Expired,
}

impl InvitationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
        }
    }
}

impl std::str::FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown invitation status: {other}")),
        }
    }
}

/// Group invitation entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInvitation {
    pub id: Uuid,
    pub code: InviteCode,
    pub group_id: Uuid,
    pub invited_by: Uuid,
    /// Present for direct invitations; absent for shareable codes
    pub invited_user: Option<Uuid>,
    pub status: InvitationStatus,
    pub max_uses: i32,
    pub used_count: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupInvitation {
    /// Create a direct invitation for a specific user (single-use)
    pub fn direct(
        id: Uuid,
        code: InviteCode,
        group_id: Uuid,
        invited_by: Uuid,
        invited_user: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            code,
            group_id,
            invited_by,
            invited_user: Some(invited_user),
            status: InvitationStatus::Pending,
            max_uses: 1,
            used_count: 0,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a shareable code invitation
    pub fn shareable(
        id: Uuid,
        code: InviteCode,
        group_id: Uuid,
        invited_by: Uuid,
        max_uses: i32,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            code,
            group_id,
            invited_by,
            invited_user: None,
            status: InvitationStatus::Pending,
            max_uses,
            used_count: 0,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Default expiry from an issuance instant
    pub fn default_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(DEFAULT_TTL_DAYS)
    }

    /// Whether this invitation addresses one specific user
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.invited_user.is_some()
    }

    /// Check if the invitation has passed its expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Check if the use budget is spent
    pub fn is_exhausted(&self) -> bool {
        self.used_count >= self.max_uses
    }

    /// Validate redeemability, surfacing the specific failure
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != InvitationStatus::Pending {
            return Err(DomainError::InviteNotPending);
        }
        if self.is_expired(now) {
            return Err(DomainError::InviteExpired);
        }
        if self.is_exhausted() {
            return Err(DomainError::InviteExhausted);
        }
        Ok(())
    }

    /// Record one redemption.
    ///
    /// Direct invitations flip straight to accepted; shareable codes stay
    /// pending until the budget is spent so other redeemers can reuse them.
    pub fn consume(&mut self) {
        self.used_count += 1;
        if self.is_direct() || self.used_count >= self.max_uses {
            self.status = InvitationStatus::Accepted;
        }
        self.updated_at = Utc::now();
    }

    /// Remaining uses before exhaustion
    pub fn remaining_uses(&self) -> i32 {
        (self.max_uses - self.used_count).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_invite() -> GroupInvitation {
        GroupInvitation::direct(
            Uuid::new_v4(),
            InviteCode::generate(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            GroupInvitation::default_expiry(Utc::now()),
        )
    }

    fn code_invite(max_uses: i32) -> GroupInvitation {
        GroupInvitation::shareable(
            Uuid::new_v4(),
            InviteCode::generate(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            max_uses,
            GroupInvitation::default_expiry(Utc::now()),
        )
    }

    #[test]
    fn test_direct_invite_defaults() {
        let invite = direct_invite();
        assert!(invite.is_direct());
        assert_eq!(invite.max_uses, 1);
        assert!(invite.validate(Utc::now()).is_ok());
    }

    #[test]
    fn test_direct_consume_accepts() {
        let mut invite = direct_invite();
        invite.consume();
        assert_eq!(invite.status, InvitationStatus::Accepted);
        assert_eq!(invite.used_count, 1);
        assert!(matches!(
            invite.validate(Utc::now()),
            Err(DomainError::InviteNotPending)
        ));
    }

    #[test]
    fn test_code_invite_stays_pending_until_budget_spent() {
        let mut invite = code_invite(3);
        invite.consume();
        invite.consume();
        assert_eq!(invite.status, InvitationStatus::Pending);
        assert_eq!(invite.remaining_uses(), 1);

        invite.consume();
        assert_eq!(invite.status, InvitationStatus::Accepted);
        assert_eq!(invite.remaining_uses(), 0);
    }

    #[test]
    fn test_expired_invite() {
        let mut invite = code_invite(5);
        invite.expires_at = Utc::now() - Duration::hours(1);
        assert!(matches!(
            invite.validate(Utc::now()),
            Err(DomainError::InviteExpired)
        ));
    }

    #[test]
    fn test_exhausted_before_status_flip() {
        // Exhaustion is caught even if the status flip was missed upstream
        let mut invite = code_invite(2);
        invite.used_count = 2;
        assert!(matches!(
            invite.validate(Utc::now()),
            Err(DomainError::InviteExhausted)
        ));
    }

    #[test]
    fn test_expiry_checked_before_exhaustion() {
        let mut invite = code_invite(1);
        invite.used_count = 1;
        invite.expires_at = Utc::now() - Duration::minutes(5);
        // Expiry is reported first
        assert!(matches!(
            invite.validate(Utc::now()),
            Err(DomainError::InviteExpired)
        ));
    }
}
