//! Linked-account facts backing persona capability checks.
//!
//! A persona is genuinely held only while a linked lawyer/customer account
//! row exists; these lookups are never cached so revoked accounts take
//! effect immediately.

use super::placeholders;
use crate::domain::Persona;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;
use std::collections::HashSet;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// True iff a linked account of the persona's kind exists for the user.
    async fn has_linked_account(&self, user_id: Uuid, persona: Persona) -> Result<bool>;

    /// Batch form: the subset of `user_ids` holding a linked account of the
    /// persona's kind.
    async fn find_linked_accounts(
        &self,
        user_ids: &[Uuid],
        persona: Persona,
    ) -> Result<HashSet<Uuid>>;
}

pub struct AccountRepositoryImpl {
    pool: MySqlPool,
}

impl AccountRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn table_for(persona: Persona) -> &'static str {
        match persona {
            Persona::Lawyer => "lawyer_accounts",
            Persona::Customer => "customer_accounts",
        }
    }
}

#[async_trait]
impl AccountRepository for AccountRepositoryImpl {
    async fn has_linked_account(&self, user_id: Uuid, persona: Persona) -> Result<bool> {
        let sql = format!(
            "SELECT user_id FROM {} WHERE user_id = ?",
            Self::table_for(persona)
        );
        let found: Option<(Uuid,)> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn find_linked_accounts(
        &self,
        user_ids: &[Uuid],
        persona: Persona,
    ) -> Result<HashSet<Uuid>> {
        if user_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT user_id FROM {} WHERE user_id IN ({})",
            Self::table_for(persona),
            placeholders(user_ids.len())
        );
        let mut query = sqlx::query_as::<_, (Uuid,)>(&sql);
        for id in user_ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
