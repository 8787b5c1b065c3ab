//! In-memory repository fakes for end-to-end engine tests.
//!
//! Unlike mocks, these carry real state: grant layers are plain maps, so a
//! batch write by the orchestrator is visible to the evaluator on the next
//! check, which is what the end-to-end scenarios exercise.

use async_trait::async_trait;
use lexcase_core::domain::{
    Attribute, GrantRow, GrantTuple, Permission, Persona, PermissionId, ResourceMeta,
};
use lexcase_core::error::{AppError, Result};
use lexcase_core::repository::{
    AccountRepository, GrantRepository, IdentityRepository, PermissionRepository,
    ResourceMetaRepository,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    pub permissions: Mutex<Vec<Permission>>,
    pub users: Mutex<HashSet<Uuid>>,
    pub roles: Mutex<HashSet<Uuid>>,
    pub attributes: Mutex<Vec<Attribute>>,
    pub lawyer_accounts: Mutex<HashSet<Uuid>>,
    pub customer_accounts: Mutex<HashSet<Uuid>>,
    pub role_grants: Mutex<HashMap<Uuid, Vec<GrantRow>>>,
    pub user_overrides: Mutex<HashSet<GrantTuple>>,
    pub case_acls: Mutex<HashMap<(Uuid, Uuid), Vec<GrantRow>>>,
    pub relationship_acls: Mutex<HashMap<(Uuid, Uuid), Vec<GrantRow>>>,
    pub cases: Mutex<HashMap<Uuid, ResourceMeta>>,
    pub user_profiles: Mutex<HashMap<Uuid, ResourceMeta>>,
    pub fail_writes: Mutex<bool>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_permission(&self, name: &str) -> PermissionId {
        let id = PermissionId::new(Uuid::new_v4());
        lock(&self.permissions).push(Permission {
            id,
            code: name.to_string(),
            description: None,
        });
        id
    }

    pub fn add_user(&self) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.users).insert(id);
        id
    }

    pub fn add_role(&self) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.roles).insert(id);
        id
    }

    pub fn add_attribute(&self, code: &str) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.attributes).push(Attribute {
            id,
            code: code.to_string(),
        });
        id
    }

    pub fn link_account(&self, user_id: Uuid, persona: Persona) {
        match persona {
            Persona::Lawyer => lock(&self.lawyer_accounts).insert(user_id),
            Persona::Customer => lock(&self.customer_accounts).insert(user_id),
        };
    }

    pub fn add_role_grant(&self, role_id: Uuid, permission_id: PermissionId, attribute_id: Option<Uuid>) {
        lock(&self.role_grants).entry(role_id).or_default().push(GrantRow {
            permission_id,
            attribute_id,
        });
    }

    pub fn add_case_acl(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        permission_id: PermissionId,
        attribute_id: Option<Uuid>,
    ) {
        lock(&self.case_acls)
            .entry((case_id, user_id))
            .or_default()
            .push(GrantRow {
                permission_id,
                attribute_id,
            });
    }

    pub fn add_case(&self, private: bool, owner_user_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.cases).insert(
            id,
            ResourceMeta {
                private,
                owner_user_id,
            },
        );
        id
    }

    pub fn add_user_profile(&self, user_id: Uuid, private: bool) {
        lock(&self.user_profiles).insert(
            user_id,
            ResourceMeta {
                private,
                owner_user_id: user_id,
            },
        );
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }

    pub fn override_count(&self) -> usize {
        lock(&self.user_overrides).len()
    }

    fn accounts_for(&self, persona: Persona) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        match persona {
            Persona::Lawyer => lock(&self.lawyer_accounts),
            Persona::Customer => lock(&self.customer_accounts),
        }
    }
}

pub struct FakeRepos {
    pub store: std::sync::Arc<InMemoryStore>,
}

#[async_trait]
impl PermissionRepository for FakeRepos {
    async fn find_all(&self) -> Result<Vec<Permission>> {
        Ok(lock(&self.store.permissions).clone())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(lock(&self.store.permissions)
            .iter()
            .any(|permission| permission.id.as_uuid() == id))
    }

    async fn exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let known: HashSet<Uuid> = lock(&self.store.permissions)
            .iter()
            .map(|permission| permission.id.as_uuid())
            .collect();
        Ok(ids.iter().copied().filter(|id| known.contains(id)).collect())
    }
}

#[async_trait]
impl IdentityRepository for FakeRepos {
    async fn user_exists(&self, id: Uuid) -> Result<bool> {
        Ok(lock(&self.store.users).contains(&id))
    }

    async fn role_exists(&self, id: Uuid) -> Result<bool> {
        Ok(lock(&self.store.roles).contains(&id))
    }

    async fn attribute_exists(&self, id: Uuid) -> Result<bool> {
        Ok(lock(&self.store.attributes)
            .iter()
            .any(|attribute| attribute.id == id))
    }

    async fn users_exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let known = lock(&self.store.users);
        Ok(ids.iter().copied().filter(|id| known.contains(id)).collect())
    }

    async fn roles_exist(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let known = lock(&self.store.roles);
        Ok(ids.iter().copied().filter(|id| known.contains(id)).collect())
    }

    async fn find_attributes(&self, ids: &[Uuid]) -> Result<Vec<Attribute>> {
        let wanted: HashSet<Uuid> = ids.iter().copied().collect();
        Ok(lock(&self.store.attributes)
            .iter()
            .filter(|attribute| wanted.contains(&attribute.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AccountRepository for FakeRepos {
    async fn has_linked_account(&self, user_id: Uuid, persona: Persona) -> Result<bool> {
        Ok(self.store.accounts_for(persona).contains(&user_id))
    }

    async fn find_linked_accounts(
        &self,
        user_ids: &[Uuid],
        persona: Persona,
    ) -> Result<HashSet<Uuid>> {
        let linked = self.store.accounts_for(persona);
        Ok(user_ids
            .iter()
            .copied()
            .filter(|id| linked.contains(id))
            .collect())
    }
}

#[async_trait]
impl GrantRepository for FakeRepos {
    async fn find_role_grants(&self, role_id: Uuid) -> Result<Vec<GrantRow>> {
        Ok(lock(&self.store.role_grants)
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_user_override_grants(&self, user_id: Uuid, role_id: Uuid) -> Result<Vec<GrantRow>> {
        Ok(lock(&self.store.user_overrides)
            .iter()
            .filter(|tuple| tuple.user_id == user_id && tuple.role_id == role_id)
            .map(|tuple| GrantRow {
                permission_id: tuple.permission_id,
                attribute_id: tuple.attribute_id,
            })
            .collect())
    }

    async fn find_case_acl_grants(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        _role_id: Uuid,
    ) -> Result<Vec<GrantRow>> {
        Ok(lock(&self.store.case_acls)
            .get(&(case_id, user_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_relationship_acl_grants(
        &self,
        related_user_id: Uuid,
        user_id: Uuid,
        _role_id: Uuid,
    ) -> Result<Vec<GrantRow>> {
        Ok(lock(&self.store.relationship_acls)
            .get(&(related_user_id, user_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_user_override_grants(&self, tuples: &[GrantTuple]) -> Result<()> {
        if *lock(&self.store.fail_writes) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        let mut overrides = lock(&self.store.user_overrides);
        for tuple in tuples {
            overrides.insert(tuple.clone());
        }
        Ok(())
    }

    async fn delete_user_override_grants(&self, tuples: &[GrantTuple]) -> Result<()> {
        if *lock(&self.store.fail_writes) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        let mut overrides = lock(&self.store.user_overrides);
        for tuple in tuples {
            overrides.remove(tuple);
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceMetaRepository for FakeRepos {
    async fn find_case_meta(&self, case_id: Uuid) -> Result<Option<ResourceMeta>> {
        Ok(lock(&self.store.cases).get(&case_id).cloned())
    }

    async fn find_user_meta(&self, user_id: Uuid) -> Result<Option<ResourceMeta>> {
        Ok(lock(&self.store.user_profiles).get(&user_id).cloned())
    }
}
