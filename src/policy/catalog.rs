//! Process-wide permission name catalog.
//!
//! Read-mostly: populated at startup from the `permissions` table, refreshed
//! rarely. Concurrent readers never block each other beyond the RwLock.

use crate::domain::PermissionId;
use crate::error::Result;
use crate::repository::PermissionRepository;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub struct PermissionCatalog {
    entries: RwLock<HashMap<String, PermissionId>>,
}

impl PermissionCatalog {
    /// Empty catalog; every resolve yields the unresolved sentinel until a
    /// load happens.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Catalog from fixed entries, mainly for tests and seeding tools.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, PermissionId)>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Load the full catalog from storage.
    pub async fn load<P: PermissionRepository + ?Sized>(repo: &P) -> Result<Self> {
        let catalog = Self::new();
        catalog.refresh(repo).await?;
        Ok(catalog)
    }

    /// Replace the map wholesale; readers see either the old or the new map.
    pub async fn refresh<P: PermissionRepository + ?Sized>(&self, repo: &P) -> Result<()> {
        let permissions = repo.find_all().await?;
        let entries: HashMap<String, PermissionId> = permissions
            .into_iter()
            .map(|permission| (permission.code, permission.id))
            .collect();

        tracing::debug!(count = entries.len(), "permission catalog refreshed");
        *self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner) = entries;
        Ok(())
    }

    /// Resolve a permission name to its id. Never errors: unknown names get
    /// the unresolved sentinel, which matches no grant row (fail-closed), so
    /// checks may safely reference not-yet-seeded permissions.
    pub fn resolve(&self, name: &str) -> PermissionId {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(PermissionId::UNRESOLVED)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::new()
    }
}
