//! Grant store: read projections over the three additive grant layers plus
//! the transactional batch writes for user-override grants.
//!
//! No decision logic lives here; the evaluator owns all semantics.

use crate::domain::{GrantRow, GrantTuple};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Role-wide grants for every principal holding the role.
    async fn find_role_grants(&self, role_id: Uuid) -> Result<Vec<GrantRow>>;

    /// Per-user override grants.
    async fn find_user_override_grants(&self, user_id: Uuid, role_id: Uuid)
        -> Result<Vec<GrantRow>>;

    /// ACL grants scoped to one case.
    async fn find_case_acl_grants(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<GrantRow>>;

    /// ACL grants scoped to one user-relationship record.
    async fn find_relationship_acl_grants(
        &self,
        related_user_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<GrantRow>>;

    /// Insert override grants in one transaction. Idempotent: tuples that
    /// already exist are ignored.
    async fn insert_user_override_grants(&self, tuples: &[GrantTuple]) -> Result<()>;

    /// Delete override grants in one transaction. Idempotent: absent tuples
    /// delete zero rows.
    async fn delete_user_override_grants(&self, tuples: &[GrantTuple]) -> Result<()>;
}

pub struct GrantRepositoryImpl {
    pool: MySqlPool,
}

impl GrantRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GrantRepository for GrantRepositoryImpl {
    async fn find_role_grants(&self, role_id: Uuid) -> Result<Vec<GrantRow>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            "SELECT permission_id, attribute_id FROM role_permissions WHERE role_id = ?",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_user_override_grants(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<GrantRow>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT permission_id, attribute_id
            FROM user_permission_overrides
            WHERE user_id = ? AND role_id = ?
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_case_acl_grants(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<GrantRow>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT permission_id, attribute_id
            FROM case_acl_permissions
            WHERE case_id = ? AND user_id = ? AND role_id = ?
            "#,
        )
        .bind(case_id)
        .bind(user_id)
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_relationship_acl_grants(
        &self,
        related_user_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<GrantRow>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT permission_id, attribute_id
            FROM user_relationship_acl_permissions
            WHERE related_user_id = ? AND user_id = ? AND role_id = ?
            "#,
        )
        .bind(related_user_id)
        .bind(user_id)
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_user_override_grants(&self, tuples: &[GrantTuple]) -> Result<()> {
        if tuples.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        let granted_at = Utc::now();

        for tuple in tuples {
            sqlx::query(
                r#"
                INSERT IGNORE INTO user_permission_overrides
                    (user_id, permission_id, role_id, attribute_id, granted_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(tuple.user_id)
            .bind(tuple.permission_id)
            .bind(tuple.role_id)
            .bind(tuple.attribute_id)
            .bind(granted_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_user_override_grants(&self, tuples: &[GrantTuple]) -> Result<()> {
        if tuples.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for tuple in tuples {
            // <=> is MySQL's NULL-safe equality, so a NULL attribute tuple
            // only removes the persona-agnostic row.
            sqlx::query(
                r#"
                DELETE FROM user_permission_overrides
                WHERE user_id = ? AND permission_id = ? AND role_id = ? AND attribute_id <=> ?
                "#,
            )
            .bind(tuple.user_id)
            .bind(tuple.permission_id)
            .bind(tuple.role_id)
            .bind(tuple.attribute_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
