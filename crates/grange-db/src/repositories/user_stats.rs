//! PostgreSQL implementation of UserStatsRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use grange_core::traits::{RepoResult, UserStatsRepository};

use super::error::map_db_error;

/// PostgreSQL implementation of UserStatsRepository
#[derive(Clone)]
pub struct PgUserStatsRepository {
    pool: PgPool,
}

impl PgUserStatsRepository {
    /// Create a new PgUserStatsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStatsRepository for PgUserStatsRepository {
    #[instrument(skip(self))]
    async fn adjust_joined_count(&self, user_id: Uuid, delta: i32) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_group_stats (user_id, joined_group_count)
            VALUES ($1, GREATEST(0, $2))
            ON CONFLICT (user_id)
            DO UPDATE SET joined_group_count = GREATEST(0, user_group_stats.joined_group_count + $2)
            ",
        )
        .bind(user_id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn joined_count(&self, user_id: Uuid) -> RepoResult<i32> {
        let count = sqlx::query_scalar::<_, i32>(
            r"
            SELECT joined_group_count FROM user_group_stats WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgUserStatsRepository>();
    }
}
