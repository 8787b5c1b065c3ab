//! Permission catalog repository

use super::placeholders;
use crate::domain::Permission;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;
use std::collections::HashSet;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Full catalog, loaded at startup and on refresh.
    async fn find_all(&self) -> Result<Vec<Permission>>;

    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Batch form of [`exists`](Self::exists): returns the subset of `ids`
    /// present in storage.
    async fn exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>>;
}

pub struct PermissionRepositoryImpl {
    pool: MySqlPool,
}

impl PermissionRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PermissionRepositoryImpl {
    async fn find_all(&self) -> Result<Vec<Permission>> {
        let permissions =
            sqlx::query_as::<_, Permission>("SELECT id, code, description FROM permissions")
                .fetch_all(&self.pool)
                .await?;

        Ok(permissions)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM permissions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT id FROM permissions WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, (Uuid,)>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
