//! Data access layer (Repository pattern)

pub mod account;
pub mod grant;
pub mod identity;
pub mod permission;
pub mod resource_meta;

pub use account::{AccountRepository, AccountRepositoryImpl};
pub use grant::{GrantRepository, GrantRepositoryImpl};
pub use identity::{IdentityRepository, IdentityRepositoryImpl};
pub use permission::{PermissionRepository, PermissionRepositoryImpl};
pub use resource_meta::{ResourceMetaRepository, ResourceMetaRepositoryImpl};

use crate::config::DatabaseConfig;
use crate::error::Result;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    pool: MySqlPool,
}

impl DbPool {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Build a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    pub fn inner(&self) -> &MySqlPool {
        &self.pool
    }
}

impl std::ops::Deref for DbPool {
    type Target = MySqlPool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

/// Build a `?, ?, ...` placeholder list for an IN clause.
pub(crate) fn placeholders(len: usize) -> String {
    vec!["?"; len].join(", ")
}
