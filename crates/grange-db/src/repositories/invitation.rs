//! PostgreSQL implementation of InvitationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use grange_core::error::DomainError;
use grange_core::traits::{InvitationRepository, RepoResult};
use grange_core::{GroupInvitation, InviteCode};

use crate::models::GroupInvitationModel;

use super::error::{map_db_error, map_unique_violation};

const INVITATION_COLUMNS: &str = r"id, code, group_id, invited_by, invited_user, status,
       max_uses, used_count, expires_at, created_at, updated_at";

/// PostgreSQL implementation of InvitationRepository
#[derive(Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    /// Create a new PgInvitationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &InviteCode) -> RepoResult<Option<GroupInvitation>> {
        let result = sqlx::query_as::<_, GroupInvitationModel>(&format!(
            r"
            SELECT {INVITATION_COLUMNS}
            FROM group_invitations
            WHERE code = $1
            ",
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(GroupInvitation::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_group(&self, group_id: Uuid) -> RepoResult<Vec<GroupInvitation>> {
        let results = sqlx::query_as::<_, GroupInvitationModel>(&format!(
            r"
            SELECT {INVITATION_COLUMNS}
            FROM group_invitations
            WHERE group_id = $1
            ORDER BY created_at DESC
            ",
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(GroupInvitation::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_pending_direct(
        &self,
        group_id: Uuid,
        invited_user: Uuid,
    ) -> RepoResult<Option<GroupInvitation>> {
        let result = sqlx::query_as::<_, GroupInvitationModel>(&format!(
            r"
            SELECT {INVITATION_COLUMNS}
            FROM group_invitations
            WHERE group_id = $1 AND invited_user = $2 AND status = 'pending'
            LIMIT 1
            ",
        ))
        .bind(group_id)
        .bind(invited_user)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(GroupInvitation::try_from).transpose()
    }

    #[instrument(skip(self, invitation))]
    async fn create(&self, invitation: &GroupInvitation) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO group_invitations (id, code, group_id, invited_by, invited_user,
                                           status, max_uses, used_count, expires_at,
                                           created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(invitation.id)
        .bind(invitation.code.as_str())
        .bind(invitation.group_id)
        .bind(invitation.invited_by)
        .bind(invitation.invited_user)
        .bind(invitation.status.as_str())
        .bind(invitation.max_uses)
        .bind(invitation.used_count)
        .bind(invitation.expires_at)
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::InviteCodeExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn expire(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE group_invitations
            SET status = 'expired', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InviteNotPending);
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
        assert_send_sync::<PgInvitationRepository>();
    }
}
