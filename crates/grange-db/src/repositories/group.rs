//! PostgreSQL implementation of GroupRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use grange_core::error::DomainError;
use grange_core::traits::{GroupRepository, RepoResult};
use grange_core::{Group, GroupMembership};

use crate::models::GroupModel;

use super::error::{group_not_found, map_db_error, map_unique_violation};

/// PostgreSQL implementation of GroupRepository
#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    /// Create a new PgGroupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Group>> {
        let result = sqlx::query_as::<_, GroupModel>(
            r"
            SELECT id, name, slug, description, privacy, owner_id, member_count,
                   post_count, is_active, created_at, updated_at
            FROM groups
            WHERE id = $1 AND is_active = TRUE
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Group::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Group>> {
        let result = sqlx::query_as::<_, GroupModel>(
            r"
            SELECT id, name, slug, description, privacy, owner_id, member_count,
                   post_count, is_active, created_at, updated_at
            FROM groups
            WHERE slug = $1 AND is_active = TRUE
            ",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Group::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Group>> {
        let results = sqlx::query_as::<_, GroupModel>(
            r"
            SELECT g.id, g.name, g.slug, g.description, g.privacy, g.owner_id, g.member_count,
                   g.post_count, g.is_active, g.created_at, g.updated_at
            FROM groups g
            JOIN group_memberships gm ON gm.group_id = g.id
            WHERE gm.user_id = $1 AND gm.status = 'active' AND g.is_active = TRUE
            ORDER BY gm.joined_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Group::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM groups WHERE slug = $1)
            ",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self, group, owner_membership))]
    async fn create_with_owner(
        &self,
        group: &Group,
        owner_membership: &GroupMembership,
    ) -> RepoResult<()> {
        // Group, owner membership, and the owner's joined-groups counter
        // commit together; a slug race surfaces as SlugConflict for the
        // caller to regenerate and retry.
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO groups (id, name, slug, description, privacy, owner_id, member_count,
                                is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 1, TRUE, $7, $8)
            ",
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.slug)
        .bind(&group.description)
        .bind(group.privacy.as_str())
        .bind(group.owner_id)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::SlugConflict))?;

        sqlx::query(
            r"
            INSERT INTO group_memberships (id, group_id, user_id, role, status, joined_at,
                                           last_activity_at, notify_new_posts, notify_events,
                                           created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(owner_membership.id)
        .bind(owner_membership.group_id)
        .bind(owner_membership.user_id)
        .bind(owner_membership.role.as_str())
        .bind(owner_membership.joined_at)
        .bind(owner_membership.last_activity_at)
        .bind(owner_membership.notifications.new_posts)
        .bind(owner_membership.notifications.events)
        .bind(owner_membership.created_at)
        .bind(owner_membership.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        sqlx::query(
            r"
            INSERT INTO user_group_stats (user_id, joined_group_count)
            VALUES ($1, 1)
            ON CONFLICT (user_id)
            DO UPDATE SET joined_group_count = user_group_stats.joined_group_count + 1
            ",
        )
        .bind(owner_membership.user_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, group))]
    async fn update(&self, group: &Group) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE groups
            SET name = $2, slug = $3, description = $4, privacy = $5, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            ",
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.slug)
        .bind(&group.description)
        .bind(group.privacy.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::SlugConflict))?;

        if result.rows_affected() == 0 {
            return Err(group_not_found(group.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE groups
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(group_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn adjust_member_count(&self, group_id: Uuid, delta: i32) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE groups
            SET member_count = GREATEST(0, member_count + $2), updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(group_id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(group_not_found(group_id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgGroupRepository>();
    }
}
