//! PostgreSQL implementation of UserDirectory
//!
//! Read-only projection over the identity subsystem's users table.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use grange_core::traits::{RepoResult, UserDirectory, UserDisplay};

use crate::models::UserDisplayModel;

use super::error::map_db_error;

/// PostgreSQL implementation of UserDirectory
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new PgUserDirectory
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self))]
    async fn display(&self, user_id: Uuid) -> RepoResult<Option<UserDisplay>> {
        let result = sqlx::query_as::<_, UserDisplayModel>(
            r"
            SELECT id, display_name, avatar
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(UserDisplay::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgUserDirectory>();
    }
}
