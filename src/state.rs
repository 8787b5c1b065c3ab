//! Shared application state wiring repositories, the permission engine, and
//! the grant batch service onto one connection pool.

use crate::config::Config;
use crate::domain::{GrantBatchRequest, GrantItemResult, GrantOp, Principal};
use crate::error::Result;
use crate::policy::{PermissionCatalog, PermissionEngine};
use crate::repository::{
    AccountRepositoryImpl, DbPool, GrantRepositoryImpl, IdentityRepositoryImpl,
    PermissionRepositoryImpl, ResourceMetaRepositoryImpl,
};
use crate::service::GrantBatchService;
use std::sync::Arc;

pub type Engine =
    PermissionEngine<GrantRepositoryImpl, AccountRepositoryImpl, ResourceMetaRepositoryImpl>;
pub type BatchService = GrantBatchService<
    GrantRepositoryImpl,
    AccountRepositoryImpl,
    IdentityRepositoryImpl,
    PermissionRepositoryImpl,
>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<PermissionCatalog>,
    pub engine: Engine,
    pub grant_batch: BatchService,
}

impl AppState {
    /// Wire everything onto an existing pool. Loads the permission catalog
    /// once; call [`PermissionCatalog::refresh`] after mutating the
    /// permissions table.
    pub async fn new(config: Config, pool: DbPool) -> Result<Self> {
        let mysql = pool.inner().clone();

        let permissions = Arc::new(PermissionRepositoryImpl::new(mysql.clone()));
        let grants = Arc::new(GrantRepositoryImpl::new(mysql.clone()));
        let accounts = Arc::new(AccountRepositoryImpl::new(mysql.clone()));
        let identities = Arc::new(IdentityRepositoryImpl::new(mysql.clone()));
        let resources = Arc::new(ResourceMetaRepositoryImpl::new(mysql));

        let catalog = Arc::new(PermissionCatalog::load(permissions.as_ref()).await?);
        tracing::info!(permissions = catalog.len(), "permission catalog loaded");

        let engine = PermissionEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&grants),
            Arc::clone(&accounts),
            resources,
        );
        let grant_batch = GrantBatchService::new(
            Arc::clone(&catalog),
            grants,
            accounts,
            identities,
            permissions,
        );

        Ok(Self {
            config: Arc::new(config),
            catalog,
            engine,
            grant_batch,
        })
    }

    /// Connect a fresh pool from configuration and wire state onto it.
    pub async fn from_config(config: Config) -> Result<Self> {
        let pool = DbPool::connect(&config.database).await?;
        Self::new(config, pool).await
    }

    pub async fn apply_grant_batch(
        &self,
        acting: &Principal,
        request: GrantBatchRequest,
    ) -> Result<Vec<GrantItemResult>> {
        self.grant_batch
            .apply_request(acting, GrantOp::Grant, request)
            .await
    }

    pub async fn apply_revoke_batch(
        &self,
        acting: &Principal,
        request: GrantBatchRequest,
    ) -> Result<Vec<GrantItemResult>> {
        self.grant_batch
            .apply_request(acting, GrantOp::Revoke, request)
            .await
    }
}
