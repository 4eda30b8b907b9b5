//! PostgreSQL implementation of MembershipRepository
//!
//! Status transitions are conditional updates guarded on the expected
//! current status in the WHERE clause, so concurrent writers cannot race a
//! record through an illegal edge.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use grange_core::error::DomainError;
use grange_core::traits::{MembershipRepository, RepoResult};
use grange_core::{GroupMembership, GroupRole, NotificationPrefs};

use crate::mappers::membership_from_model;
use crate::models::GroupMembershipModel;

use super::error::{map_db_error, map_unique_violation, membership_not_found};

const MEMBERSHIP_COLUMNS: &str = r"id, group_id, user_id, role, status, joined_at, invited_by,
       ban_reason, banned_by, banned_at, last_activity_at,
       notify_new_posts, notify_events, created_at, updated_at";

/// PostgreSQL implementation of MembershipRepository
#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    /// Create a new PgMembershipRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Zero rows on a guarded transition: either the record is gone or it
    /// is not in the expected state. Disambiguate for the caller.
    async fn transition_failure(&self, id: Uuid, from: &str, to: &str) -> DomainError {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_memberships WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;

        match exists {
            Ok(true) => DomainError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
            Ok(false) => membership_not_found(),
            Err(e) => map_db_error(e),
        }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    #[instrument(skip(self))]
    async fn find(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<Option<GroupMembership>> {
        let result = sqlx::query_as::<_, GroupMembershipModel>(&format!(
            r"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM group_memberships
            WHERE group_id = $1 AND user_id = $2
            ",
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(membership_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<GroupMembership>> {
        let result = sqlx::query_as::<_, GroupMembershipModel>(&format!(
            r"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM group_memberships
            WHERE id = $1
            ",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(membership_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn is_active_member(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM group_memberships
                WHERE group_id = $1 AND user_id = $2 AND status = 'active'
            )
            ",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_by_group(
        &self,
        group_id: Uuid,
        limit: i64,
        after: Option<Uuid>,
    ) -> RepoResult<Vec<GroupMembership>> {
        let limit = limit.clamp(1, 1000);

        let results = match after {
            Some(after_id) => {
                sqlx::query_as::<_, GroupMembershipModel>(&format!(
                    r"
                    SELECT {MEMBERSHIP_COLUMNS}
                    FROM group_memberships
                    WHERE group_id = $1 AND status = 'active' AND user_id > $2
                    ORDER BY user_id
                    LIMIT $3
                    ",
                ))
                .bind(group_id)
                .bind(after_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, GroupMembershipModel>(&format!(
                    r"
                    SELECT {MEMBERSHIP_COLUMNS}
                    FROM group_memberships
                    WHERE group_id = $1 AND status = 'active'
                    ORDER BY user_id
                    LIMIT $2
                    ",
                ))
                .bind(group_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        results.into_iter().map(membership_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<GroupMembership>> {
        let results = sqlx::query_as::<_, GroupMembershipModel>(&format!(
            r"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM group_memberships
            WHERE user_id = $1
            ORDER BY joined_at DESC
            ",
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(membership_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn list_staff(&self, group_id: Uuid) -> RepoResult<Vec<GroupMembership>> {
        let results = sqlx::query_as::<_, GroupMembershipModel>(&format!(
            r"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM group_memberships
            WHERE group_id = $1 AND status = 'active'
              AND role IN ('moderator', 'admin', 'owner')
            ORDER BY joined_at
            ",
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(membership_from_model).collect()
    }

    #[instrument(skip(self, membership))]
    async fn create(&self, membership: &GroupMembership) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO group_memberships (id, group_id, user_id, role, status, joined_at,
                                           invited_by, last_activity_at, notify_new_posts,
                                           notify_events, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(membership.id)
        .bind(membership.group_id)
        .bind(membership.user_id)
        .bind(membership.role.as_str())
        .bind(membership.status.as_str())
        .bind(membership.joined_at)
        .bind(membership.invited_by)
        .bind(membership.last_activity_at)
        .bind(membership.notifications.new_posts)
        .bind(membership.notifications.events)
        .bind(membership.created_at)
        .bind(membership.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reactivate(&self, id: Uuid, invited_by: Option<Uuid>) -> RepoResult<GroupMembership> {
        let result = sqlx::query_as::<_, GroupMembershipModel>(&format!(
            r"
            UPDATE group_memberships
            SET status = 'active', joined_at = NOW(), invited_by = $2,
                ban_reason = NULL, banned_by = NULL, banned_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = 'left'
            RETURNING {MEMBERSHIP_COLUMNS}
            ",
        ))
        .bind(id)
        .bind(invited_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match result {
            Some(model) => membership_from_model(model),
            None => Err(DomainError::InvalidTransition {
                from: "unknown".to_string(),
                to: "active".to_string(),
            }),
        }
    }

    #[instrument(skip(self, reason))]
    async fn ban(&self, id: Uuid, banned_by: Uuid, reason: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_memberships
            SET status = 'banned', ban_reason = $2, banned_by = $3, banned_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'active'
            ",
        )
        .bind(id)
        .bind(reason)
        .bind(banned_by)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(self.transition_failure(id, "active", "banned").await);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn unban(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_memberships
            SET status = 'active', ban_reason = NULL, banned_by = NULL, banned_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = 'banned'
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(self.transition_failure(id, "banned", "active").await);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_left(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_memberships
            SET status = 'left', updated_at = NOW()
            WHERE id = $1 AND status = 'active'
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(self.transition_failure(id, "active", "left").await);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn approve(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_memberships
            SET status = 'active', joined_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(self.transition_failure(id, "pending", "active").await);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_pending(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM group_memberships WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(membership_not_found());
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_role(&self, id: Uuid, role: GroupRole) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_memberships
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(membership_not_found());
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_notifications(&self, id: Uuid, prefs: NotificationPrefs) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_memberships
            SET notify_new_posts = $2, notify_events = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(prefs.new_posts)
        .bind(prefs.events)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(membership_not_found());
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn touch_activity(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE group_memberships
            SET last_activity_at = NOW()
            WHERE group_id = $1 AND user_id = $2 AND status = 'active'
            ",
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMembershipRepository>();
    }
}
