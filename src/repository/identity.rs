//! Existence checks for principal components (users, roles, attributes)

use super::placeholders;
use crate::domain::Attribute;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;
use std::collections::HashSet;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn user_exists(&self, id: Uuid) -> Result<bool>;
    async fn role_exists(&self, id: Uuid) -> Result<bool>;
    async fn attribute_exists(&self, id: Uuid) -> Result<bool>;

    /// Batch forms return the subset of `ids` present in storage.
    async fn users_exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>>;
    async fn roles_exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>>;

    /// Attribute rows for the given ids; missing ids are simply absent.
    async fn find_attributes(&self, ids: &[Uuid]) -> Result<Vec<Attribute>>;
}

pub struct IdentityRepositoryImpl {
    pool: MySqlPool,
}

impl IdentityRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn id_exists(&self, table: &str, id: Uuid) -> Result<bool> {
        let sql = format!("SELECT id FROM {table} WHERE id = ?");
        let found: Option<(Uuid,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn ids_exist(&self, table: &str, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT id FROM {table} WHERE id IN ({})",
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

#[async_trait]
impl IdentityRepository for IdentityRepositoryImpl {
    async fn user_exists(&self, id: Uuid) -> Result<bool> {
        self.id_exists("users", id).await
    }

    async fn role_exists(&self, id: Uuid) -> Result<bool> {
        self.id_exists("roles", id).await
    }

    async fn attribute_exists(&self, id: Uuid) -> Result<bool> {
        self.id_exists("attributes", id).await
    }

    async fn users_exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        self.ids_exist("users", ids).await
    }

    async fn roles_exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        self.ids_exist("roles", ids).await
    }

    async fn find_attributes(&self, ids: &[Uuid]) -> Result<Vec<Attribute>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, code FROM attributes WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, Attribute>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let attributes = query.fetch_all(&self.pool).await?;
        Ok(attributes)
    }
}
