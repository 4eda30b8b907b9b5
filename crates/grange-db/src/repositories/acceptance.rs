//! The atomic acceptance unit
//!
//! Redeeming an invitation touches three tables and four rows: the
//! membership record, the group's member counter, the redeemer's
//! joined-groups counter, and the invitation's use budget. All four writes
//! run in one transaction; a failure at any step rolls back everything.
//!
//! The service layer validates beforehand, but every guard is re-asserted
//! here in SQL because concurrent redeemers can invalidate a read between
//! validation and commit.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use grange_core::error::DomainError;
use grange_core::traits::{AcceptInvitation, AcceptanceUnit, RepoResult};
use grange_core::{GroupMembership, GroupRole};

use crate::mappers::membership_from_model;
use crate::models::GroupMembershipModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of the acceptance unit
#[derive(Clone)]
pub struct PgAcceptanceUnit {
    pool: PgPool,
}

impl PgAcceptanceUnit {
    /// Create a new PgAcceptanceUnit
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fresh membership or flip a `left` record back to active.
    ///
    /// The ON CONFLICT arm only fires its update when the existing record is
    /// `left`; for any other status the statement returns no row, which the
    /// unique constraint semantics let us report as "already a member".
    async fn upsert_membership(
        tx: &mut Transaction<'_, Postgres>,
        membership_id: Uuid,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
        invited_by: Option<Uuid>,
    ) -> RepoResult<GroupMembership> {
        let result = sqlx::query_as::<_, GroupMembershipModel>(
            r"
            INSERT INTO group_memberships (id, group_id, user_id, role, status, joined_at,
                                           invited_by, last_activity_at, notify_new_posts,
                                           notify_events, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'active', NOW(), $5, NOW(), TRUE, TRUE, NOW(), NOW())
            ON CONFLICT (group_id, user_id) DO UPDATE
            SET status = 'active', role = EXCLUDED.role, joined_at = NOW(),
                invited_by = EXCLUDED.invited_by,
                ban_reason = NULL, banned_by = NULL, banned_at = NULL,
                updated_at = NOW()
            WHERE group_memberships.status = 'left'
            RETURNING id, group_id, user_id, role, status, joined_at, invited_by,
                      ban_reason, banned_by, banned_at, last_activity_at,
                      notify_new_posts, notify_events, created_at, updated_at
            ",
        )
        .bind(membership_id)
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(invited_by)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        match result {
            Some(model) => membership_from_model(model),
            // Conflict row exists but is not `left`: active, pending, or banned
            None => Err(DomainError::AlreadyMember),
        }
    }

    /// Increment the group's member counter, insisting the group is alive
    async fn bump_member_count(
        tx: &mut Transaction<'_, Postgres>,
        group_id: Uuid,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE groups
            SET member_count = member_count + 1, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            ",
        )
        .bind(group_id)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::group_not_found(group_id));
        }

        Ok(())
    }

    /// Increment the redeemer's joined-groups counter
    async fn bump_joined_count(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_group_stats (user_id, joined_group_count)
            VALUES ($1, 1)
            ON CONFLICT (user_id)
            DO UPDATE SET joined_group_count = user_group_stats.joined_group_count + 1
            ",
        )
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    /// Consume one use of the invitation, bounded by the budget.
    ///
    /// The WHERE clause is the arbiter under concurrency: once the budget
    /// is spent (or the invitation expired out from under us), the update
    /// matches nothing and this redemption loses.
    async fn consume_invitation(
        tx: &mut Transaction<'_, Postgres>,
        invitation_id: Uuid,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_invitations
            SET used_count = used_count + 1,
                status = CASE
                    WHEN invited_user IS NOT NULL OR used_count + 1 >= max_uses
                    THEN 'accepted'
                    ELSE status
                END,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
              AND used_count < max_uses
              AND expires_at > NOW()
            ",
        )
        .bind(invitation_id)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InviteExhausted);
        }

        Ok(())
    }
}

#[async_trait]
impl AcceptanceUnit for PgAcceptanceUnit {
    #[instrument(skip(self, cmd), fields(group_id = %cmd.group_id, user_id = %cmd.user_id))]
    async fn accept(&self, cmd: AcceptInvitation) -> RepoResult<GroupMembership> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let membership = Self::upsert_membership(
            &mut tx,
            cmd.membership_id,
            cmd.group_id,
            cmd.user_id,
            cmd.role,
            Some(cmd.invited_by),
        )
        .await?;
        Self::bump_member_count(&mut tx, cmd.group_id).await?;
        Self::bump_joined_count(&mut tx, cmd.user_id).await?;
        Self::consume_invitation(&mut tx, cmd.invitation_id).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(membership)
    }

    #[instrument(skip(self))]
    async fn join(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        membership_id: Uuid,
    ) -> RepoResult<GroupMembership> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let membership = Self::upsert_membership(
            &mut tx,
            membership_id,
            group_id,
            user_id,
            GroupRole::Member,
            None,
        )
        .await?;
        Self::bump_member_count(&mut tx, group_id).await?;
        Self::bump_joined_count(&mut tx, user_id).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(membership)
    }
}
