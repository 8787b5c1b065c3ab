//! Visibility metadata fetch for resources under access check

use crate::domain::ResourceMeta;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceMetaRepository: Send + Sync {
    /// `(private, owner)` for a case; the creator is the owner.
    async fn find_case_meta(&self, case_id: Uuid) -> Result<Option<ResourceMeta>>;

    /// `(private, owner)` for a user-relationship record; the related user
    /// is their own owner.
    async fn find_user_meta(&self, user_id: Uuid) -> Result<Option<ResourceMeta>>;
}

pub struct ResourceMetaRepositoryImpl {
    pool: MySqlPool,
}

impl ResourceMetaRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceMetaRepository for ResourceMetaRepositoryImpl {
    async fn find_case_meta(&self, case_id: Uuid) -> Result<Option<ResourceMeta>> {
        let meta = sqlx::query_as::<_, ResourceMeta>(
            "SELECT private, created_by AS owner_user_id FROM cases WHERE id = ?",
        )
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(meta)
    }

    async fn find_user_meta(&self, user_id: Uuid) -> Result<Option<ResourceMeta>> {
        let meta = sqlx::query_as::<_, ResourceMeta>(
            "SELECT profile_private AS private, id AS owner_user_id FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(meta)
    }
}
